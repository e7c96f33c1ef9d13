//! Tool registry
//!
//! The set of tools is closed: [`ToolKind`] names every capability the model
//! can call and dispatch is a plain `match`.

use serde_json::Value;
use thiserror::Error;

use super::answer::{self, Answer, SchemaError, ANSWER_TOOL};
use super::think::{self, ReasoningSink, THINK_TOOL};
use crate::llm::ToolDefinition;

/// Acknowledgement sent back to the model after a `think` call
pub const THINK_ACK: &str = "Thought shared with the user. Continue.";

/// The capabilities exposed to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Think,
    Answer,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::Think, ToolKind::Answer];

    pub fn name(self) -> &'static str {
        match self {
            Self::Think => THINK_TOOL,
            Self::Answer => ANSWER_TOOL,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn definition(self) -> ToolDefinition {
        match self {
            Self::Think => think::definition(),
            Self::Answer => answer::definition(),
        }
    }
}

/// A parsed, validated tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Think(String),
    Answer(Answer),
}

/// What the agent loop should do after a tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Non-terminal; send the acknowledgement back to the model
    Continue(String),
    /// Terminal; the turn is over
    Finished(Answer),
}

/// A tool call the registry refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolCallError {
    #[error("unknown tool `{0}`")]
    UnknownTool(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Registry of the tools available to the agent
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry;

impl ToolRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Tool definitions to send to the model
    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        ToolKind::ALL.into_iter().map(ToolKind::definition).collect()
    }

    /// Parse a raw tool call into its typed form
    pub fn parse(&self, name: &str, input: &Value) -> Result<ToolCall, ToolCallError> {
        let kind =
            ToolKind::from_name(name).ok_or_else(|| ToolCallError::UnknownTool(name.to_string()))?;

        let call = match kind {
            ToolKind::Think => ToolCall::Think(think::parse_input(input)?),
            ToolKind::Answer => ToolCall::Answer(Answer::from_input(input)?),
        };
        Ok(call)
    }

    /// Parse and run a tool call
    ///
    /// `think` reaches the sink before this returns.
    pub fn execute(
        &self,
        name: &str,
        input: &Value,
        sink: &mut dyn ReasoningSink,
    ) -> Result<ToolOutcome, ToolCallError> {
        match self.parse(name, input)? {
            ToolCall::Think(thought) => {
                tracing::debug!("Agent thinking: {}", thought);
                sink.on_think(&thought);
                Ok(ToolOutcome::Continue(THINK_ACK.to_string()))
            }
            ToolCall::Answer(answer) => {
                tracing::info!("Answer received (success={})", answer.success());
                Ok(ToolOutcome::Finished(answer))
            }
        }
    }
}
