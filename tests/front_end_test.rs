mod common;

use std::io::Cursor;
use std::sync::Arc;

use ai_shell::agent::default_system_prompt;
use ai_shell::cli::{request_from_args, Console, FrontEnd, RunOutcome, ANSWER_LABEL, CONFIRM_PROMPT};
use ai_shell::llm::LlmError;
use ai_shell::{Agent, ToolRegistry};
use common::*;
use serde_json::json;

struct Harness {
    front_end: FrontEnd<Cursor<String>, RecordingExecutor>,
    executor: RecordingExecutor,
    out: SharedBuffer,
    err: SharedBuffer,
}

fn harness(input: &str) -> Harness {
    let out = SharedBuffer::default();
    let err = SharedBuffer::default();
    let executor = RecordingExecutor::default();
    let console = Console::with_writers(Box::new(out.clone()), Box::new(err.clone()));
    Harness {
        front_end: FrontEnd::new(console, Cursor::new(input.to_string()), executor.clone()),
        executor,
        out,
        err,
    }
}

fn agent(provider: Arc<ScriptedProvider>) -> Agent {
    Agent::new(provider, ToolRegistry::new(), fast_settings())
}

async fn run_with(input: &str, provider: Arc<ScriptedProvider>, request: &str) -> (RunOutcome, Harness) {
    let mut h = harness(input);
    let outcome = h
        .front_end
        .run(&agent(provider), &default_system_prompt(), request)
        .await;
    (outcome, h)
}

#[tokio::test]
async fn affirmative_input_executes_exactly_once() {
    for input in ["y\n", "Y\n", "y"] {
        let provider = ScriptedProvider::new(vec![Ok(command("echo hi"))]);
        let (outcome, h) = run_with(input, provider, "say hi").await;

        assert_eq!(outcome, RunOutcome::Executed("echo hi".to_string()));
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(h.executor.executed(), vec!["echo hi"]);
    }
}

#[tokio::test]
async fn anything_else_declines_silently() {
    for input in ["n\n", "N\n", "yes\n", "\n", "", "maybe\n"] {
        let provider = ScriptedProvider::new(vec![Ok(command("echo hi"))]);
        let (outcome, h) = run_with(input, provider, "say hi").await;

        assert_eq!(outcome, RunOutcome::Declined("echo hi".to_string()));
        assert_eq!(outcome.exit_code(), 0);
        assert!(h.executor.executed().is_empty(), "input {input:?} executed");
        assert!(h.err.contents().is_empty());
    }
}

#[tokio::test]
async fn reasoning_is_shown_in_order_before_command() {
    let provider = ScriptedProvider::new(vec![
        Ok(think("alpha reasoning")),
        Ok(think("beta reasoning")),
        Ok(command("echo hi")),
    ]);
    let (_, h) = run_with("n\n", provider, "say hi").await;

    let out = h.out.contents();
    let alpha = out.find("alpha reasoning").unwrap();
    let beta = out.find("beta reasoning").unwrap();
    let cmd = out.find("echo hi").unwrap();
    let prompt = out.find(CONFIRM_PROMPT).unwrap();
    assert!(alpha < beta && beta < cmd && cmd < prompt);
}

#[tokio::test]
async fn end_to_end_sort_by_size() {
    let request = request_from_args(["list", "files", "in", "current", "directory", "sorted", "by", "size"]);
    assert_eq!(request, "list files in current directory sorted by size");

    let provider = ScriptedProvider::new(vec![
        Ok(think("Using ls with -S for size sort")),
        Ok(answer(json!({"success": true, "cmd": "ls -S", "failure": null}))),
    ]);
    let (outcome, h) = run_with("Y\n", provider.clone(), &request).await;

    assert_eq!(outcome, RunOutcome::Executed("ls -S".to_string()));
    assert_eq!(h.executor.executed(), vec!["ls -S"]);

    let out = h.out.contents();
    assert!(out.find("Using ls with -S").unwrap() < out.find(ANSWER_LABEL).unwrap());
    assert!(out.contains(CONFIRM_PROMPT));

    let first = provider.messages(0);
    assert_eq!(first.len(), 1);
    assert_eq!(
        first[0],
        ai_shell::llm::Message::user("list files in current directory sorted by size")
    );
}

#[tokio::test]
async fn empty_request_exits_nonzero_without_model() {
    let provider = ScriptedProvider::new(vec![Ok(command("ls"))]);
    let (outcome, h) = run_with("y\n", provider.clone(), "").await;

    assert_eq!(outcome, RunOutcome::EmptyRequest);
    assert_ne!(outcome.exit_code(), 0);
    assert_eq!(provider.calls(), 0);
    assert!(h.executor.executed().is_empty());
    assert!(h.out.contents().contains("No prompts"));
    assert!(h.err.contents().is_empty());
}

#[tokio::test]
async fn failure_answer_reports_and_exits_nonzero() {
    let provider = ScriptedProvider::new(vec![Ok(answer(
        json!({"success": false, "failure": "Cannot be done in a shell"}),
    ))]);
    let (outcome, h) = run_with("y\n", provider, "make coffee").await;

    assert_eq!(
        outcome,
        RunOutcome::GenerationFailed("Cannot be done in a shell".to_string())
    );
    assert_ne!(outcome.exit_code(), 0);
    assert!(h.executor.executed().is_empty());

    let out = h.out.contents();
    assert!(out.contains("Cannot be done in a shell"));
    assert!(out.contains("Generate failed"));
    assert!(!out.contains(CONFIRM_PROMPT));
}

#[tokio::test]
async fn agent_error_is_reported_not_panicked() {
    let provider = ScriptedProvider::new(vec![Err(LlmError::Api {
        status: 403,
        body: "forbidden".to_string(),
    })]);
    let (outcome, h) = run_with("y\n", provider, "list files").await;

    assert!(matches!(outcome, RunOutcome::AgentFailed(ref msg) if msg.contains("403")));
    assert_ne!(outcome.exit_code(), 0);
    assert!(h.executor.executed().is_empty());
    assert!(h.err.contents().contains("Error:"));
}

#[tokio::test]
async fn invalid_answer_never_reaches_front_end() {
    let provider = ScriptedProvider::repeating(answer(json!({"success": true, "cmd": "a\nb"})));
    let (outcome, h) = run_with("y\n", provider, "two commands").await;

    assert!(matches!(outcome, RunOutcome::AgentFailed(_)));
    assert!(h.executor.executed().is_empty());
    assert!(!h.out.contents().contains(CONFIRM_PROMPT));
}
