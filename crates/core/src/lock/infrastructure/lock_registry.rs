use std::collections::HashMap;

use crate::lock::domain::lock_mechanism::{LockMechanism, UnsupportedLock};

use super::command_lock::{CommandLock, LockCommand};

/// Platform identifier of the running host (`std::env::consts::OS`).
pub fn current_platform() -> &'static str {
    std::env::consts::OS
}

/// Maps platform identifiers to the commands that lock a session there.
///
/// Identifiers are matched case-insensitively, and `darwin` is accepted as
/// an alias for `macos`. Unknown identifiers resolve to [`UnsupportedLock`].
pub struct LockRegistry {
    commands: HashMap<String, Vec<LockCommand>>,
}

impl LockRegistry {
    fn empty() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registry with the built-in Linux, macOS and Windows commands.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(
            "linux",
            vec![
                LockCommand::new("gnome-screensaver-command", &["-l"]),
                LockCommand::new("loginctl", &["lock-session"]),
                LockCommand::new("xdg-screensaver", &["lock"]),
            ],
        );
        registry.register(
            "macos",
            vec![
                LockCommand::new(
                    "/System/Library/CoreServices/Menu Extras/User.menu/Contents/Resources/CGSession",
                    &["-suspend"],
                ),
                LockCommand::new("pmset", &["displaysleepnow"]),
            ],
        );
        registry.register(
            "windows",
            vec![LockCommand::new("rundll32.exe", &["user32.dll,LockWorkStation"])],
        );
        registry
    }

    /// Replaces whatever is registered for `platform`.
    pub fn register(&mut self, platform: &str, commands: Vec<LockCommand>) {
        self.commands.insert(normalize(platform), commands);
    }

    pub fn is_supported(&self, platform: &str) -> bool {
        self.commands.contains_key(&normalize(platform))
    }

    pub fn resolve(&self, platform: &str) -> Box<dyn LockMechanism> {
        match self.commands.get(&normalize(platform)) {
            Some(commands) => Box::new(CommandLock::new(commands.clone())),
            None => {
                log::warn!("Unsupported operating system: {platform}. The screen will not be locked.");
                Box::new(UnsupportedLock::new(platform))
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but a user-supplied command line
    /// takes precedence over anything registered for the platform.
    pub fn resolve_with(&self, platform: &str, custom: Option<&[String]>) -> Box<dyn LockMechanism> {
        match custom.and_then(LockCommand::from_argv) {
            Some(command) => {
                log::debug!("Using custom lock command: {command}");
                Box::new(CommandLock::new(vec![command]))
            }
            None => self.resolve(platform),
        }
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn normalize(platform: &str) -> String {
    let lower = platform.trim().to_ascii_lowercase();
    match lower.as_str() {
        "darwin" | "osx" => "macos".to_string(),
        _ => lower,
    }
}
