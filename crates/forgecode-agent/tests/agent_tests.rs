//! End-to-end turn-loop tests against a `ScriptedProvider` — no network
//! access anywhere in this file (§4.12, §8).

use forgecode_agent::Agent;
use forgecode_core::{AgentConfig, ContentBlock, NullSink};
use forgecode_llm::{LlmResponse, ScriptedProvider, Usage};
use forgecode_tools::{create_default_registry, SkillIndex};
use std::sync::Arc;
use tempfile::tempdir;

fn config(workdir: &std::path::Path) -> AgentConfig {
    AgentConfig {
        model: "claude-test".to_string(),
        max_thinking_tokens: 1024,
        api_key: "test-key".to_string(),
        base_url: "http://localhost".to_string(),
        workdir: workdir.to_path_buf(),
    }
}

fn end_turn(text: &str) -> LlmResponse {
    LlmResponse {
        content: vec![ContentBlock::text(text)],
        stop_reason: "end_turn".to_string(),
        usage: Usage::default(),
    }
}

fn tool_use_turn(id: &str, name: &str, input: serde_json::Value) -> LlmResponse {
    LlmResponse {
        content: vec![ContentBlock::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        }],
        stop_reason: "tool_use".to_string(),
        usage: Usage::default(),
    }
}

#[tokio::test]
async fn tool_result_ids_correspond_to_tool_use_ids_in_order() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "hi").unwrap();
    let provider = Arc::new(ScriptedProvider::new(vec![
        tool_use_turn("call-1", "Read", serde_json::json!({"path": "a.txt"})),
        end_turn("read it"),
    ]));
    let mut agent = Agent::new(
        provider,
        create_default_registry(None),
        Arc::new(SkillIndex::new()),
        config(dir.path()),
        Arc::new(NullSink),
    );

    agent.turn("read the file").await;

    let messages = agent.conversation().messages();
    let assistant_tool_use = &messages[1];
    let (id, name, _) = assistant_tool_use.tool_uses()[0];
    assert_eq!(id, "call-1");
    assert_eq!(name, "Read");

    let tool_result_message = &messages[2];
    match &tool_result_message.content[0] {
        ContentBlock::ToolResult { tool_use_id, content, .. } => {
            assert_eq!(tool_use_id, "call-1");
            assert_eq!(content, "hi");
        }
        other => panic!("expected a tool result block, got {other:?}"),
    }
}

#[tokio::test]
async fn interrupt_before_first_tool_dispatch_executes_zero_tools() {
    let dir = tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::new(vec![tool_use_turn(
        "call-1",
        "Bash",
        serde_json::json!({"command": "echo hi"}),
    )]));
    let mut agent = Agent::new(
        provider,
        create_default_registry(None),
        Arc::new(SkillIndex::new()),
        config(dir.path()),
        Arc::new(NullSink),
    );

    // Interrupt is requested before the turn ever begins, so it is observed
    // at poll point (1), before the model is even called.
    agent.interrupt_flag().request();
    agent.turn("do something").await;

    let last = agent.conversation().last().unwrap();
    let notification = last.first_text().unwrap();
    assert!(notification.contains("task_interrupted"));
}

#[tokio::test]
async fn subagent_conversation_has_exactly_one_message_and_no_task_tool() {
    use forgecode_agent::make_spawn_subagent;
    use forgecode_tools::WorkspaceGuard;

    let dir = tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::new(vec![end_turn("3 python files found")]));
    let spawn = make_spawn_subagent(
        provider.clone(),
        Arc::new(SkillIndex::new()),
        Arc::new(WorkspaceGuard::new(dir.path())),
        config(dir.path()),
    );

    let result = spawn("Explore".to_string(), "list .py files".to_string()).await;
    assert_eq!(result, "3 python files found");

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages.len(), 1);
    assert!(requests[0].tools.iter().all(|t| t.name != "Task"));
}

#[tokio::test]
async fn recorder_sink_observes_interrupted_exactly_once() {
    use std::sync::Mutex;

    struct RecordingSink {
        interrupted_count: Mutex<usize>,
    }

    impl forgecode_core::UiSink for RecordingSink {
        fn write(&self, _text: &str) {}
        fn styled_write(&self, _style: forgecode_core::Style, _text: &str) {}
        fn newline(&self) {}
        fn clear(&self) {}
        fn thinking(&self, _content: &str, _duration: std::time::Duration) {}
        fn response(&self, _markdown_text: &str) {}
        fn tool_call(&self, _name: &str, _input: &serde_json::Value) {}
        fn tool_result(&self, _output: &str, _max_len: usize) {}
        fn interrupted(&self) {
            *self.interrupted_count.lock().unwrap() += 1;
        }
        fn status(&self, _message: &str, _spinning: bool) {}
    }

    let dir = tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::new(vec![end_turn("won't be reached")]));
    let sink = Arc::new(RecordingSink { interrupted_count: Mutex::new(0) });
    let mut agent = Agent::new(
        provider,
        create_default_registry(None),
        Arc::new(SkillIndex::new()),
        config(dir.path()),
        sink.clone(),
    );

    agent.interrupt_flag().request();
    agent.turn("hello").await;

    assert_eq!(*sink.interrupted_count.lock().unwrap(), 1);
}
