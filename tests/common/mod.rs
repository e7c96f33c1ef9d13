//! Shared test doubles: a scripted model, a recording executor and an
//! in-memory terminal.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ai_shell::cli::CommandExecutor;
use ai_shell::llm::{
    ContentBlock, LlmError, LlmProvider, LlmResult, Message, MessageResponse, StopReason,
    ToolDefinition,
};
use ai_shell::AgentSettings;
use async_trait::async_trait;
use serde_json::{json, Value};

/// A model that replays canned responses
pub struct ScriptedProvider {
    script: Mutex<VecDeque<LlmResult<MessageResponse>>>,
    fallback: Option<MessageResponse>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<LlmResult<MessageResponse>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback: None,
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Answers every call with the same response once the script runs out
    pub fn repeating(response: MessageResponse) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(response),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Messages sent on the nth call (0-based)
    pub fn messages(&self, call: usize) -> Vec<Message> {
        self.seen.lock().unwrap()[call].clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn send_with_tools(
        &self,
        _system_prompt: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> LlmResult<MessageResponse> {
        assert_eq!(tools.len(), 2, "both tools must always be offered");
        self.seen.lock().unwrap().push(messages.to_vec());

        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        self.fallback
            .clone()
            .ok_or_else(|| LlmError::decode("script exhausted"))
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn provider_name(&self) -> &str {
        "test"
    }
}

fn tool_response(calls: Vec<(&str, Value)>) -> MessageResponse {
    let content = calls
        .into_iter()
        .enumerate()
        .map(|(i, (name, input))| ContentBlock::tool_use(format!("call-{}", i + 1), name, input))
        .collect();
    MessageResponse {
        content,
        stop_reason: Some(StopReason::ToolUse),
        model: "scripted".to_string(),
    }
}

pub fn think(s: &str) -> MessageResponse {
    tool_response(vec![("think", json!({ "s": s }))])
}

pub fn answer(input: Value) -> MessageResponse {
    tool_response(vec![("answer", input)])
}

pub fn command(cmd: &str) -> MessageResponse {
    answer(json!({ "success": true, "cmd": cmd, "failure": null }))
}

pub fn calls(calls: Vec<(&str, Value)>) -> MessageResponse {
    tool_response(calls)
}

pub fn text(s: &str) -> MessageResponse {
    MessageResponse {
        content: vec![ContentBlock::text(s)],
        stop_reason: Some(StopReason::EndTurn),
        model: "scripted".to_string(),
    }
}

/// Limits with no retry delay
pub fn fast_settings() -> AgentSettings {
    AgentSettings {
        retry_backoff: Duration::ZERO,
        ..AgentSettings::default()
    }
}

/// Records every hand-off instead of running it
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    pub commands: Arc<Mutex<Vec<String>>>,
}

impl RecordingExecutor {
    pub fn executed(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn execute(&mut self, cmd: &str) -> io::Result<()> {
        self.commands.lock().unwrap().push(cmd.to_string());
        Ok(())
    }
}

/// Cloneable in-memory writer
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
