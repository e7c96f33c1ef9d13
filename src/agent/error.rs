//! Agent error taxonomy

use thiserror::Error;

use crate::llm::LlmError;
use crate::tools::SchemaError;

/// The model did not follow the tool protocol
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("model replied with text instead of calling a tool: {0:?}")]
    FreeText(String),

    #[error("model called undeclared tool `{0}`")]
    UnknownTool(String),

    #[error("no answer after {0} rounds")]
    MaxRoundsExceeded(usize),
}

/// Why a request produced no [`crate::tools::Answer`]
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("request is empty")]
    EmptyRequest,

    #[error("model provider failed after {attempts} attempt(s): {source}")]
    Transport { attempts: usize, source: LlmError },

    #[error("model kept sending an invalid answer ({attempts} attempt(s)): {source}")]
    SchemaValidation { attempts: usize, source: SchemaError },

    #[error("protocol violation: {0}")]
    ProtocolViolation(#[from] ProtocolViolation),
}
