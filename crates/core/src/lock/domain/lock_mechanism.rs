use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockError {
    #[error("unsupported operating system: {platform}")]
    Unsupported { platform: String },
    #[error("failed to run lock command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no lock command configured")]
    NoCommand,
}

/// Locks the user's session.
///
/// Invoked at most once per run. Implementations must return promptly:
/// the caller stops monitoring right after, whatever the outcome, because
/// nothing reports back whether the screen really locked.
pub trait LockMechanism: Send {
    fn lock(&mut self) -> Result<(), LockError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Fallback for hosts without a known lock command: reports and does nothing.
pub struct UnsupportedLock {
    platform: String,
}

impl UnsupportedLock {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }
}

impl LockMechanism for UnsupportedLock {
    fn lock(&mut self) -> Result<(), LockError> {
        Err(LockError::Unsupported {
            platform: self.platform.clone(),
        })
    }

    fn describe(&self) -> String {
        format!("unsupported ({})", self.platform)
    }
}
