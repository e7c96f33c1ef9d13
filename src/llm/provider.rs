//! The model capability boundary

use async_trait::async_trait;

use super::error::LlmResult;
use super::types::{Message, MessageResponse, ToolDefinition};

/// A language model that can be driven with tools
///
/// Implementations must translate transport failures into [`super::LlmError`]
/// and must never hang past their configured request timeout.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the exchange so far and get the model's next turn
    async fn send_with_tools(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> LlmResult<MessageResponse>;

    /// The model identifier in use
    fn model(&self) -> &str;

    /// Short provider name for logs
    fn provider_name(&self) -> &str;
}
