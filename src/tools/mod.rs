//! Tool system for the agent
//!
//! Two tools are exposed to the model: `think` streams reasoning to the user
//! and `answer` ends the turn with a validated [`Answer`].

pub mod answer;
mod registry;
pub mod think;

pub use answer::{Answer, AnswerArgs, SchemaError};
pub use registry::{ToolCall, ToolCallError, ToolKind, ToolOutcome, ToolRegistry, THINK_ACK};
pub use think::ReasoningSink;
