//! The `think` tool: a one-way channel for the model's reasoning

use serde::Deserialize;
use serde_json::{json, Value};

use super::answer::SchemaError;
use crate::llm::{define_tool, ToolDefinition};

pub const THINK_TOOL: &str = "think";

/// Receives reasoning fragments as the model emits them
pub trait ReasoningSink {
    fn on_think(&mut self, thought: &str);
}

/// Collects fragments in order; handy when the caller prints nothing
impl ReasoningSink for Vec<String> {
    fn on_think(&mut self, thought: &str) {
        self.push(thought.to_string());
    }
}

#[derive(Debug, Deserialize)]
struct ThinkArgs {
    s: String,
}

/// Extract the reasoning text from a `think` call
pub fn parse_input(input: &Value) -> Result<String, SchemaError> {
    let args: ThinkArgs = serde_json::from_value(input.clone())
        .map_err(|e| SchemaError::invalid_arguments(THINK_TOOL, e))?;
    Ok(args.s)
}

/// Schema of the `think` tool
pub fn definition() -> ToolDefinition {
    define_tool(
        THINK_TOOL,
        "Communicate your thought process to the user. Use it to justify the \
         command you choose, considering efficiency, safety and best practices.",
        json!({
            "s": {
                "type": "string",
                "description": "A description of your reasoning or decision-making process."
            }
        }),
        vec!["s".to_string()],
    )
}
