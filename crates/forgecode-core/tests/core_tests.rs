//! Integration tests for message/conversation invariants and settings precedence.

use forgecode_core::{AgentConfig, ContentBlock, Conversation, Error, Message, Role, Settings};

#[test]
fn conversation_append_only_and_ordered() {
    let mut convo = Conversation::new();
    convo.push(Message::user_text("hello"));
    convo.push(Message::assistant_blocks(vec![ContentBlock::text("hi")]));
    assert_eq!(convo.len(), 2);
    assert_eq!(convo.messages()[0].role, Role::User);
    assert_eq!(convo.messages()[1].role, Role::Assistant);
}

#[test]
fn conversation_clear_resets_state() {
    let mut convo = Conversation::new();
    convo.push(Message::user_text("hello"));
    convo.clear();
    assert!(convo.is_empty());
}

#[test]
fn message_tool_uses_extracts_in_emission_order() {
    let msg = Message::assistant_blocks(vec![
        ContentBlock::Thinking {
            thinking: "reasoning".into(),
        },
        ContentBlock::ToolUse {
            id: "t1".into(),
            name: "Read".into(),
            input: serde_json::json!({"path": "a"}),
        },
        ContentBlock::ToolUse {
            id: "t2".into(),
            name: "Write".into(),
            input: serde_json::json!({"path": "b"}),
        },
    ]);
    let uses = msg.tool_uses();
    assert_eq!(uses.len(), 2);
    assert_eq!(uses[0].0, "t1");
    assert_eq!(uses[1].0, "t2");
}

#[test]
fn message_first_text_skips_other_blocks() {
    let msg = Message::assistant_blocks(vec![
        ContentBlock::Thinking {
            thinking: "x".into(),
        },
        ContentBlock::text("the answer"),
    ]);
    assert_eq!(msg.first_text(), Some("the answer"));
}

#[test]
fn agent_config_clamps_thinking_tokens_to_floor() {
    assert_eq!(AgentConfig::clamp_thinking_tokens(100), 1024);
    assert_eq!(AgentConfig::clamp_thinking_tokens(5000), 5000);
}

#[test]
fn error_to_tool_result_is_error_prefixed() {
    let e = Error::WorkspaceEscape {
        path: "../etc/passwd".into(),
    };
    assert!(e.to_tool_result().starts_with("Error: "));
    assert!(e.to_tool_result().contains("Path escapes workspace"));
}

#[test]
fn settings_respects_precedence_chain() {
    let dir = std::env::temp_dir().join(format!("forgecode-core-settings-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("settings.json");
    std::fs::write(
        &path,
        r#"{"env":{"ANTHROPIC_BASE_URL":"https://file.example"}}"#,
    )
    .unwrap();
    let settings = Settings::load_from(path);
    assert_eq!(settings.anthropic_base_url, "https://file.example");
    assert!(settings.max_thinking_tokens >= 1024);
}
