//! Google Gemini API client
//!
//! Uses the `generateContent` endpoint with function calling. Gemini function
//! calls carry no id, so ids are synthesized per response and mapped back to
//! function names when tool results are sent.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::{LlmError, LlmResult};
use super::provider::LlmProvider;
use super::types::{ContentBlock, Message, MessageResponse, Role, StopReason, ToolDefinition};
use super::{build_http_client, DEFAULT_TIMEOUT};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTools>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<GeminiToolConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
    /// Present on function calls from thinking models; must be sent back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTools {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiToolConfig {
    function_calling_config: GeminiFunctionCallingConfig,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionCallingConfig {
    mode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl GeminiProvider {
    /// Create a provider for the default model with the given API key
    pub fn new(api_key: impl Into<String>) -> LlmResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::configuration("Gemini provider requires an API key"));
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

    /// Override the API base URL
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

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }

    fn build_request(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> GenerateContentRequest {
        let declarations: Vec<GeminiFunctionDeclaration> = tools
            .iter()
            .map(|tool| GeminiFunctionDeclaration {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.to_json(),
            })
            .collect();

        let (tools, tool_config) = if declarations.is_empty() {
            (Vec::new(), None)
        } else {
            // ANY: the model must reply with a function call
            (
                vec![GeminiTools {
                    function_declarations: declarations,
                }],
                Some(GeminiToolConfig {
                    function_calling_config: GeminiFunctionCallingConfig {
                        mode: "ANY".to_string(),
                    },
                }),
            )
        };

        GenerateContentRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(system_prompt.to_string()),
                    ..Default::default()
                }],
            },
            contents: convert_messages(messages),
            tools,
            tool_config,
        }
    }

    fn convert_response(&self, response: GenerateContentResponse) -> LlmResult<MessageResponse> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::decode("no candidates in Gemini response"))?;

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        let mut content = Vec::new();
        let mut call_index = 0;
        for part in parts {
            if let Some(text) = part.text.filter(|t| !t.is_empty()) {
                content.push(ContentBlock::text(text));
            }
            if let Some(call) = part.function_call {
                call_index += 1;
                let id = format!("{}-{}", call.name, call_index);
                content.push(ContentBlock::ToolUse {
                    id,
                    name: call.name,
                    input: call.args,
                    signature: part.thought_signature,
                });
            }
        }

        let stop_reason = if content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
        {
            Some(StopReason::ToolUse)
        } else {
            candidate.finish_reason.as_deref().map(|r| match r {
                "MAX_TOKENS" => StopReason::MaxTokens,
                "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => {
                    StopReason::Refusal
                }
                _ => StopReason::EndTurn,
            })
        };

        Ok(MessageResponse {
            content,
            stop_reason,
            model: response.model_version.unwrap_or_else(|| self.model.clone()),
        })
    }
}

/// Convert the exchange to Gemini `contents`
///
/// Tool results need the function name, recovered from earlier tool uses.
fn convert_messages(messages: &[Message]) -> Vec<GeminiContent> {
    let mut names_by_id: HashMap<String, String> = HashMap::new();
    let mut contents = Vec::with_capacity(messages.len());

    for msg in messages {
        let role = match msg.role {
            Role::User => "user",
            Role::Assistant => "model",
        };

        let mut parts = Vec::new();
        for block in msg.blocks() {
            match block {
                ContentBlock::Text { text } => parts.push(GeminiPart {
                    text: Some(text),
                    ..Default::default()
                }),
                ContentBlock::ToolUse {
                    id,
                    name,
                    input,
                    signature,
                } => {
                    names_by_id.insert(id, name.clone());
                    parts.push(GeminiPart {
                        function_call: Some(GeminiFunctionCall { name, args: input }),
                        thought_signature: signature,
                        ..Default::default()
                    });
                }
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => {
                    let name = names_by_id
                        .get(&tool_use_id)
                        .cloned()
                        .unwrap_or(tool_use_id);
                    let response = if is_error {
                        json!({ "error": content })
                    } else {
                        json!({ "result": content })
                    };
                    parts.push(GeminiPart {
                        function_response: Some(GeminiFunctionResponse { name, response }),
                        ..Default::default()
                    });
                }
            }
        }

        contents.push(GeminiContent {
            role: Some(role.to_string()),
            parts,
        });
    }

    contents
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn send_with_tools(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> LlmResult<MessageResponse> {
        tracing::info!("[Gemini] Sending message with tools");
        tracing::debug!("[Gemini] Messages count: {}", messages.len());

        let request = self.build_request(system_prompt, messages, tools);
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::from_reqwest(e, self.timeout))?;

        tracing::debug!("[Gemini] Response status: {}", status);
        tracing::trace!("[Gemini] Response body: {}", body);

        if !status.is_success() {
            tracing::error!("[Gemini] API error: {} - {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::decode(format!("failed to parse Gemini response: {}", e)))?;
        self.convert_response(parsed)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}
