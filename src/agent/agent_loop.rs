//! Agent loop with tool calling support
//!
//! One request, one turn: the model may call `think` any number of times and
//! must finish with a single valid `answer` call. The loop is bounded by a
//! round cap, a schema retry cap and a transport retry cap.

use std::sync::Arc;
use std::time::Duration;

use super::error::{AgentError, ProtocolViolation};
use crate::llm::{ContentBlock, LlmProvider, Message, MessageResponse, ToolDefinition};
use crate::tools::{Answer, ReasoningSink, SchemaError, ToolCallError, ToolOutcome, ToolRegistry};

/// Default maximum number of model rounds in a single turn
pub const MAX_TOOL_ITERATIONS: usize = 10;

/// Limits for a single turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    /// Model rounds allowed before giving up
    pub max_rounds: usize,
    /// Invalid tool calls tolerated before giving up
    pub max_schema_retries: usize,
    /// Extra attempts after a retryable transport failure
    pub max_transport_retries: usize,
    /// Delay before the first transport retry, grows linearly
    pub retry_backoff: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_rounds: MAX_TOOL_ITERATIONS,
            max_schema_retries: 3,
            max_transport_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Result of processing one model response
enum Step {
    Finished(Answer),
    Continue {
        tool_results: Vec<ContentBlock>,
        rejected: Option<SchemaError>,
    },
}

/// Drives a single request/answer exchange with the model
pub struct Agent {
    llm_provider: Arc<dyn LlmProvider>,
    tool_registry: ToolRegistry,
    settings: AgentSettings,
}

impl Agent {
    /// Create a new Agent
    pub fn new(
        llm_provider: Arc<dyn LlmProvider>,
        tool_registry: ToolRegistry,
        settings: AgentSettings,
    ) -> Self {
        tracing::info!(
            "Creating agent ({} / {})",
            llm_provider.provider_name(),
            llm_provider.model()
        );
        Self {
            llm_provider,
            tool_registry,
            settings,
        }
    }

    /// Turn a request into an [`Answer`]
    ///
    /// Reasoning fragments reach `sink` as soon as the model emits them.
    pub async fn run(
        &self,
        system_prompt: &str,
        request: &str,
        sink: &mut dyn ReasoningSink,
    ) -> Result<Answer, AgentError> {
        let request = request.trim();
        if request.is_empty() {
            tracing::warn!("Empty request, not contacting the model");
            return Err(AgentError::EmptyRequest);
        }

        tracing::info!("Processing request: {}", request);
        let tools = self.tool_registry.get_definitions();
        let mut messages = vec![Message::user(request)];
        let mut schema_failures = 0;

        for round in 1..=self.settings.max_rounds {
            tracing::debug!("Round {}/{}", round, self.settings.max_rounds);

            let response = self.send_with_retry(system_prompt, &messages, &tools).await?;

            match self.process_response(&response, sink)? {
                Step::Finished(answer) => {
                    tracing::info!("Turn finished after {} round(s)", round);
                    return Ok(answer);
                }
                Step::Continue {
                    tool_results,
                    rejected,
                } => {
                    if let Some(err) = rejected {
                        schema_failures += 1;
                        tracing::warn!(
                            "Rejected answer ({}/{}): {}",
                            schema_failures,
                            self.settings.max_schema_retries,
                            err
                        );
                        if schema_failures > self.settings.max_schema_retries {
                            return Err(AgentError::SchemaValidation {
                                attempts: schema_failures,
                                source: err,
                            });
                        }
                    }

                    messages.push(Message::assistant_with_blocks(response.content));
                    messages.push(Message::user_with_blocks(tool_results));
                }
            }
        }

        tracing::warn!("Maximum tool iterations reached");
        Err(ProtocolViolation::MaxRoundsExceeded(self.settings.max_rounds).into())
    }

    /// Call the provider, retrying transient failures a bounded number of times
    async fn send_with_retry(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<MessageResponse, AgentError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .llm_provider
                .send_with_tools(system_prompt, messages, tools)
                .await
            {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt <= self.settings.max_transport_retries => {
                    let delay = self.settings.retry_backoff * attempt as u32;
                    tracing::warn!("Provider error (attempt {}): {}; retrying in {:?}", attempt, e, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!("Provider error (attempt {}): {}", attempt, e);
                    return Err(AgentError::Transport {
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }

    /// Process a response from the LLM
    fn process_response(
        &self,
        response: &MessageResponse,
        sink: &mut dyn ReasoningSink,
    ) -> Result<Step, AgentError> {
        if !response.has_tool_use() {
            let text = response.text();
            tracing::warn!(
                "Model replied without a tool call ({:?}): {}",
                response.stop_reason,
                text
            );
            return Err(ProtocolViolation::FreeText(text).into());
        }

        let mut tool_results = Vec::new();
        let mut rejected = None;

        for block in &response.content {
            match block {
                ContentBlock::ToolUse { id, name, input, .. } => {
                    tracing::info!("Tool use requested: {} ({})", name, id);

                    match self.tool_registry.execute(name, input, sink) {
                        Ok(ToolOutcome::Continue(ack)) => {
                            tool_results.push(ContentBlock::tool_result(id.clone(), ack));
                        }
                        Ok(ToolOutcome::Finished(answer)) => return Ok(Step::Finished(answer)),
                        Err(ToolCallError::Schema(err)) => {
                            tool_results.push(ContentBlock::tool_error(
                                id.clone(),
                                format!("{}. Call `{}` again with corrected arguments.", err, name),
                            ));
                            rejected = Some(err);
                        }
                        Err(ToolCallError::UnknownTool(name)) => {
                            return Err(ProtocolViolation::UnknownTool(name).into());
                        }
                    }
                }
                ContentBlock::Text { text } => {
                    tracing::debug!("Model text alongside tool calls: {}", text);
                }
                ContentBlock::ToolResult { .. } => {
                    tracing::warn!("Unexpected ToolResult in assistant response");
                }
            }
        }

        Ok(Step::Continue {
            tool_results,
            rejected,
        })
    }
}
