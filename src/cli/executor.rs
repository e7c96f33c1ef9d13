//! Hand-off of an approved command to the host shell
//!
//! The command runs with inherited stdio. Its output and exit status are not
//! inspected; the user sees whatever the shell prints.

use async_trait::async_trait;
use std::io;
use tokio::process::Command;

/// Runs an approved command
#[async_trait]
pub trait CommandExecutor: Send {
    /// Hand `cmd` to the shell and wait for it to finish
    ///
    /// Only a failure to start the shell is an error.
    async fn execute(&mut self, cmd: &str) -> io::Result<()>;
}

/// The operating system's command interpreter
#[derive(Debug, Clone)]
pub struct HostShell {
    program: String,
    flag: String,
}

impl HostShell {
    /// `sh -c` on Unix, `cmd /C` on Windows
    pub fn new() -> Self {
        if cfg!(windows) {
            Self::with_program("cmd", "/C")
        } else {
            Self::with_program("sh", "-c")
        }
    }

    /// Use a specific interpreter and its "run this string" flag
    pub fn with_program(program: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flag: flag.into(),
        }
    }
}

impl Default for HostShell {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for HostShell {
    async fn execute(&mut self, cmd: &str) -> io::Result<()> {
        tracing::info!("Executing command: {}", cmd);

        let status = Command::new(&self.program)
            .arg(&self.flag)
            .arg(cmd)
            .status()
            .await?;

        tracing::debug!("Command exit status: {}", status);
        Ok(())
    }
}
