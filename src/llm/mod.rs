pub mod error;
pub mod gemini;
pub mod openai;
pub mod provider;
pub mod types;

use std::time::Duration;

pub use error::{LlmError, LlmResult};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use provider::LlmProvider;
pub use types::{
    define_tool, ContentBlock, Message, MessageContent, MessageResponse, Role, StopReason,
    ToolDefinition, ToolInputSchema,
};

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client with a bounded request timeout
pub(crate) fn build_http_client(timeout: Duration) -> LlmResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::configuration(format!("failed to build HTTP client: {}", e)))
}
