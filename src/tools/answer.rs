//! The terminal `answer` tool and the [`Answer`] it produces

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::llm::{define_tool, ToolDefinition};

pub const ANSWER_TOOL: &str = "answer";

/// Why an `answer` (or `think`) call was rejected at the tool boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("invalid arguments for `{tool}`: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("success is true but no `cmd` was provided")]
    MissingCommand,

    #[error("success is false but no `failure` reason was provided")]
    MissingFailure,

    #[error("both `cmd` and `failure` were provided; supply exactly one")]
    Ambiguous,

    #[error("`cmd` must be a single line, got {lines} lines")]
    MultiLineCommand { lines: usize },
}

impl SchemaError {
    pub(crate) fn invalid_arguments(tool: &str, reason: impl ToString) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Raw arguments of an `answer` call, as the model sent them
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerArgs {
    pub success: bool,
    #[serde(default)]
    pub cmd: Option<String>,
    #[serde(default)]
    pub failure: Option<String>,
}

/// Final, validated result of one request
///
/// Either a command to run or the reason none could be produced. The only
/// way to build one from model output is [`Answer::from_args`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Command(String),
    Failure(String),
}

impl Answer {
    /// Validate raw `answer` arguments
    ///
    /// Blank strings count as absent. A command must be a single line.
    pub fn from_args(args: AnswerArgs) -> Result<Self, SchemaError> {
        let cmd = non_blank(args.cmd);
        let failure = non_blank(args.failure);

        match (args.success, cmd, failure) {
            (_, Some(_), Some(_)) => Err(SchemaError::Ambiguous),
            (true, Some(cmd), None) => {
                let cmd = cmd.trim().to_string();
                let lines = cmd.lines().count();
                if lines > 1 || cmd.contains(['\n', '\r']) {
                    return Err(SchemaError::MultiLineCommand {
                        lines: lines.max(2),
                    });
                }
                Ok(Self::Command(cmd))
            }
            (true, None, _) => Err(SchemaError::MissingCommand),
            (false, None, Some(failure)) => Ok(Self::Failure(failure)),
            (false, _, None) => Err(SchemaError::MissingFailure),
        }
    }

    /// Parse and validate the JSON input of an `answer` call
    pub fn from_input(input: &Value) -> Result<Self, SchemaError> {
        let args: AnswerArgs = serde_json::from_value(input.clone())
            .map_err(|e| SchemaError::invalid_arguments(ANSWER_TOOL, e))?;
        Self::from_args(args)
    }

    pub fn success(&self) -> bool {
        matches!(self, Self::Command(_))
    }

    pub fn cmd(&self) -> Option<&str> {
        match self {
            Self::Command(cmd) => Some(cmd),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Command(_) => None,
            Self::Failure(reason) => Some(reason),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Schema of the `answer` tool
pub fn definition() -> ToolDefinition {
    define_tool(
        ANSWER_TOOL,
        "Provide the final shell command or explain why it couldn't be generated. \
         Calling this ends your turn.",
        json!({
            "success": {
                "type": "boolean",
                "description": "Whether a shell command was successfully generated."
            },
            "cmd": {
                "type": "string",
                "description": "The generated shell command if `success` is true. \
                    It must be a single-line command. Omit it if `success` is false."
            },
            "failure": {
                "type": "string",
                "description": "If `success` is false, the reason why the command could \
                    not be generated. Omit it if `success` is true."
            }
        }),
        vec!["success".to_string()],
    )
}
