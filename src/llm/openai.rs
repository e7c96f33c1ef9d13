//! OpenAI API client
//!
//! Direct HTTP client for the Chat Completions API, translating between the
//! crate's message types and the OpenAI function-calling format. Any
//! OpenAI-compatible server works through [`OpenAiProvider::with_base_url`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{LlmError, LlmResult};
use super::provider::LlmProvider;
use super::types::{
    ContentBlock, Message, MessageContent, MessageResponse, Role, StopReason, ToolDefinition,
};
use super::{build_http_client, DEFAULT_TIMEOUT};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

// ============================================================================
// OpenAI-specific request/response types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OpenAiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl OpenAiMessage {
    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String, // JSON string
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAiFunctionDefinition,
}

#[derive(Debug, Serialize)]
struct OpenAiFunctionDefinition {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

// ============================================================================
// OpenAiProvider
// ============================================================================

/// OpenAI LLM provider
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider with a specific API key
    pub fn new(api_key: impl Into<String>) -> LlmResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::configuration("OpenAI provider requires an API key"));
        }

        Ok(Self {
            client: build_http_client(DEFAULT_TIMEOUT)?,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different OpenAI-compatible server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> LlmResult<Self> {
        self.client = build_http_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    // ========================================================================
    // Format conversion: internal -> OpenAI
    // ========================================================================

    fn convert_messages(&self, system_prompt: &str, messages: &[Message]) -> Vec<OpenAiMessage> {
        let mut openai_messages = vec![OpenAiMessage::text("system", system_prompt)];

        for msg in messages {
            match (&msg.content, msg.role) {
                (MessageContent::Text(text), Role::User) => {
                    openai_messages.push(OpenAiMessage::text("user", text.clone()));
                }
                (MessageContent::Text(text), Role::Assistant) => {
                    openai_messages.push(OpenAiMessage::text("assistant", text.clone()));
                }
                (MessageContent::Blocks(blocks), role) => {
                    convert_blocks(blocks, role, &mut openai_messages);
                }
            }
        }

        openai_messages
    }

    fn convert_tools(&self, tools: &[ToolDefinition]) -> Vec<OpenAiTool> {
        tools
            .iter()
            .map(|tool| OpenAiTool {
                tool_type: "function".to_string(),
                function: OpenAiFunctionDefinition {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.input_schema.to_json(),
                },
            })
            .collect()
    }

    fn build_request(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> OpenAiRequest {
        let tools = self.convert_tools(tools);
        // The model must always answer through a tool
        let tool_choice = (!tools.is_empty()).then(|| "required".to_string());

        OpenAiRequest {
            model: self.model.clone(),
            messages: self.convert_messages(system_prompt, messages),
            tools,
            tool_choice,
        }
    }

    // ========================================================================
    // Format conversion: OpenAI -> internal
    // ========================================================================

    fn convert_response(&self, openai_resp: OpenAiResponse) -> LlmResult<MessageResponse> {
        let choice = openai_resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::decode("no choices in OpenAI response"))?;

        let mut content = Vec::new();
        if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
            content.push(ContentBlock::text(text));
        }
        for call in choice.message.tool_calls.unwrap_or_default() {
            // Unparseable arguments are passed through as a string so the
            // tool registry can reject them with a useful message
            let input = serde_json::from_str(&call.function.arguments)
                .unwrap_or(Value::String(call.function.arguments));
            content.push(ContentBlock::tool_use(call.id, call.function.name, input));
        }

        let stop_reason = choice.finish_reason.as_deref().map(|r| match r {
            "length" => StopReason::MaxTokens,
            "tool_calls" => StopReason::ToolUse,
            "content_filter" => StopReason::Refusal,
            _ => StopReason::EndTurn,
        });

        Ok(MessageResponse {
            content,
            stop_reason,
            model: openai_resp.model,
        })
    }

    async fn send_openai_request(&self, request: &OpenAiRequest) -> LlmResult<OpenAiResponse> {
        let url = format!("{}/chat/completions", self.api_base);
        tracing::debug!("[OpenAI] POST {} (model {})", url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout))?;

        tracing::debug!("[OpenAI] Response status: {}", status);
        tracing::trace!("[OpenAI] Response body: {}", response_text);

        if !status.is_success() {
            tracing::error!("[OpenAI] API error: {} - {}", status, response_text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: response_text,
            });
        }

        serde_json::from_str(&response_text)
            .map_err(|e| LlmError::decode(format!("failed to parse OpenAI response: {}", e)))
    }
}

/// Convert content blocks of one message to OpenAI messages
///
/// Tool results become separate `tool` role messages.
fn convert_blocks(blocks: &[ContentBlock], role: Role, openai_messages: &mut Vec<OpenAiMessage>) {
    let mut text_parts: Vec<&str> = Vec::new();
    let mut tool_calls: Vec<OpenAiToolCall> = Vec::new();
    let mut tool_results: Vec<OpenAiMessage> = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } if !text.is_empty() => text_parts.push(text),
            ContentBlock::Text { .. } => {}
            ContentBlock::ToolUse { id, name, input, .. } => {
                tool_calls.push(OpenAiToolCall {
                    id: id.clone(),
                    tool_type: "function".to_string(),
                    function: OpenAiFunctionCall {
                        name: name.clone(),
                        arguments: input.to_string(),
                    },
                });
            }
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => {
                let content = if *is_error {
                    format!("Error: {}", content)
                } else {
                    content.clone()
                };
                tool_results.push(OpenAiMessage {
                    role: "tool".to_string(),
                    content: Some(content),
                    tool_calls: None,
                    tool_call_id: Some(tool_use_id.clone()),
                });
            }
        }
    }

    match role {
        Role::Assistant => openai_messages.push(OpenAiMessage {
            role: "assistant".to_string(),
            content: (!text_parts.is_empty()).then(|| text_parts.join("\n")),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            tool_call_id: None,
        }),
        Role::User if !text_parts.is_empty() => {
            openai_messages.push(OpenAiMessage::text("user", text_parts.join("\n")));
        }
        Role::User => {}
    }

    openai_messages.extend(tool_results);
}

// ============================================================================
// LlmProvider implementation
// ============================================================================

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn send_with_tools(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> LlmResult<MessageResponse> {
        tracing::info!("[OpenAI] Sending message with tools");
        tracing::debug!("[OpenAI] Messages count: {}", messages.len());

        let request = self.build_request(system_prompt, messages, tools);
        let openai_response = self.send_openai_request(&request).await?;
        self.convert_response(openai_response)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
