//! Terminal front end
//!
//! Request in, reasoning streamed out, command executed only after the user
//! confirms it.

use std::io::BufRead;

use super::console::Console;
use super::executor::CommandExecutor;
use crate::agent::{Agent, AgentError};
use crate::tools::Answer;

/// How a single invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing to ask the model
    EmptyRequest,
    /// The user approved and the command was handed to the shell
    Executed(String),
    /// The user declined; nothing ran
    Declined(String),
    /// The model explained why it could not produce a command
    GenerationFailed(String),
    /// The agent gave up (transport, schema or protocol error)
    AgentFailed(String),
}

impl RunOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Executed(_) | Self::Declined(_) => 0,
            Self::EmptyRequest | Self::GenerationFailed(_) | Self::AgentFailed(_) => 1,
        }
    }
}

/// Join invocation arguments into one request
pub fn request_from_args<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| arg.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Owns the terminal side of one invocation
pub struct FrontEnd<I, E> {
    console: Console,
    input: I,
    executor: E,
}

impl<I: BufRead, E: CommandExecutor> FrontEnd<I, E> {
    pub fn new(console: Console, input: I, executor: E) -> Self {
        Self {
            console,
            input,
            executor,
        }
    }

    /// Report an empty request; `None` means there is work to do
    pub fn reject_empty(&mut self, request: &str) -> Option<RunOutcome> {
        if request.trim().is_empty() {
            tracing::warn!("Empty request");
            self.console.print_no_prompt();
            Some(RunOutcome::EmptyRequest)
        } else {
            None
        }
    }

    /// Run one request through the agent and the confirmation gate
    pub async fn run(&mut self, agent: &Agent, system_prompt: &str, request: &str) -> RunOutcome {
        if let Some(outcome) = self.reject_empty(request) {
            return outcome;
        }

        match agent.run(system_prompt, request, &mut self.console).await {
            Ok(Answer::Command(cmd)) => self.confirm_and_execute(cmd).await,
            Ok(Answer::Failure(reason)) => {
                tracing::info!("Model could not generate a command: {}", reason);
                self.console.print_failure(&reason);
                RunOutcome::GenerationFailed(reason)
            }
            Err(AgentError::EmptyRequest) => {
                self.console.print_no_prompt();
                RunOutcome::EmptyRequest
            }
            Err(e) => {
                tracing::error!("Agent failed: {}", e);
                let message = e.to_string();
                self.console.print_error(&message);
                RunOutcome::AgentFailed(message)
            }
        }
    }

    async fn confirm_and_execute(&mut self, cmd: String) -> RunOutcome {
        self.console.print_answer(&cmd);

        if !self.console.ask_confirmation(&mut self.input) {
            tracing::info!("User declined to execute");
            return RunOutcome::Declined(cmd);
        }

        if let Err(e) = self.executor.execute(&cmd).await {
            // Not recovered: whatever happens in the shell is the user's to see
            tracing::warn!("Failed to start the host shell: {}", e);
        }
        RunOutcome::Executed(cmd)
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_args() {
        assert_eq!(
            request_from_args(["list", "files", "sorted", "by", "size"]),
            "list files sorted by size"
        );
        assert_eq!(request_from_args(Vec::<String>::new()), "");
        assert_eq!(request_from_args(["", "  "]), "");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunOutcome::Executed("ls".into()).exit_code(), 0);
        assert_eq!(RunOutcome::Declined("ls".into()).exit_code(), 0);
        assert_ne!(RunOutcome::EmptyRequest.exit_code(), 0);
        assert_ne!(RunOutcome::GenerationFailed("no".into()).exit_code(), 0);
        assert_ne!(RunOutcome::AgentFailed("boom".into()).exit_code(), 0);
    }
}
