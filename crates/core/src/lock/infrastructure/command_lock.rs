use std::process::{Command, Stdio};

use crate::lock::domain::lock_mechanism::{LockError, LockMechanism};

/// One external program plus its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LockCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Splits a `["program", "arg", ...]` list as given on the command line.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl std::fmt::Display for LockCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Locks by spawning the first candidate command that starts.
///
/// Commands are fire-and-forget: stdio is discarded and the child is never
/// waited on. A candidate only counts as failed when it cannot be spawned
/// (typically because the program is not installed).
pub struct CommandLock {
    candidates: Vec<LockCommand>,
}

impl CommandLock {
    pub fn new(candidates: Vec<LockCommand>) -> Self {
        Self { candidates }
    }
}

impl LockMechanism for CommandLock {
    fn lock(&mut self) -> Result<(), LockError> {
        let mut last_err = None;
        for candidate in &self.candidates {
            let spawned = Command::new(&candidate.program)
                .args(&candidate.args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();
            match spawned {
                Ok(_child) => {
                    log::info!("Lock command started: {candidate}");
                    return Ok(());
                }
                Err(source) => {
                    log::debug!("Lock command `{candidate}` unavailable: {source}");
                    last_err = Some(LockError::Spawn {
                        command: candidate.to_string(),
                        source,
                    });
                }
            }
        }
        Err(last_err.unwrap_or(LockError::NoCommand))
    }

    fn describe(&self) -> String {
        self.candidates
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
