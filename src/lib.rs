//! Turn a natural-language request into a single shell command.
//!
//! The [`agent::Agent`] asks a language model for the command, streaming the
//! model's `think` calls to the user and accepting exactly one validated
//! `answer`. The [`cli::FrontEnd`] shows the command and hands it to the host
//! shell only after the user confirms.

pub mod agent;
pub mod cli;
pub mod config;
pub mod llm;
pub mod logging;
pub mod tools;

pub use agent::{Agent, AgentError, AgentSettings};
pub use config::Config;
pub use tools::{Answer, ToolRegistry};
