//! Tests for forgecode-llm: request/response shapes and the scripted provider
//! double. No test in this file touches the network (§4.12).

use forgecode_core::{ContentBlock, Message, Role};
use forgecode_llm::{LlmProvider, LlmRequest, LlmResponse, ScriptedProvider, Usage};

fn text_response(text: &str, stop_reason: &str) -> LlmResponse {
    LlmResponse {
        content: vec![ContentBlock::Text {
            text: text.to_string(),
        }],
        stop_reason: stop_reason.to_string(),
        usage: Usage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

fn tool_use_response(id: &str, name: &str, input: serde_json::Value) -> LlmResponse {
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

fn request(messages: Vec<Message>) -> LlmRequest {
    LlmRequest {
        model: "claude-sonnet-4-5-20250929".to_string(),
        system: Some("You are a helpful assistant.".to_string()),
        messages,
        tools: Vec::new(),
        max_tokens: 8192,
        thinking_budget_tokens: 4096,
    }
}

#[test]
fn response_is_tool_use_reflects_stop_reason() {
    let resp = tool_use_response("toolu_1", "Read", serde_json::json!({"path": "a.txt"}));
    assert!(resp.is_tool_use());

    let resp = text_response("hi", "end_turn");
    assert!(!resp.is_tool_use());
}

#[test]
fn response_tool_uses_preserves_order() {
    let resp = LlmResponse {
        content: vec![
            ContentBlock::Text {
                text: "calling tools".into(),
            },
            ContentBlock::ToolUse {
                id: "toolu_1".into(),
                name: "Read".into(),
                input: serde_json::json!({"path": "a.txt"}),
            },
            ContentBlock::ToolUse {
                id: "toolu_2".into(),
                name: "Grep".into(),
                input: serde_json::json!({"pattern": "foo"}),
            },
        ],
        stop_reason: "tool_use".to_string(),
        usage: Usage::default(),
    };

    let uses = resp.tool_uses();
    assert_eq!(uses.len(), 2);
    assert_eq!(uses[0].0, "toolu_1");
    assert_eq!(uses[0].1, "Read");
    assert_eq!(uses[1].0, "toolu_2");
    assert_eq!(uses[1].1, "Grep");
}

#[test]
fn response_text_concatenates_blocks_in_order() {
    let resp = LlmResponse {
        content: vec![
            ContentBlock::Text {
                text: "Hello, ".into(),
            },
            ContentBlock::Text {
                text: "world.".into(),
            },
        ],
        stop_reason: "end_turn".to_string(),
        usage: Usage::default(),
    };
    assert_eq!(resp.text(), "Hello, world.");
}

#[test]
fn response_thinking_blocks_excludes_text_and_tool_use() {
    let resp = LlmResponse {
        content: vec![
            ContentBlock::Thinking {
                thinking: "considering options".into(),
            },
            ContentBlock::Text { text: "ok".into() },
        ],
        stop_reason: "end_turn".to_string(),
        usage: Usage::default(),
    };
    assert_eq!(resp.thinking_blocks(), vec!["considering options"]);
}

#[tokio::test]
async fn scripted_provider_replays_in_order() {
    let provider = ScriptedProvider::new(vec![
        text_response("first", "end_turn"),
        tool_use_response("toolu_1", "Bash", serde_json::json!({"command": "ls"})),
    ]);

    let first = provider
        .complete(request(vec![Message::user_text("hello")]))
        .await
        .unwrap();
    assert_eq!(first.text(), "first");

    let second = provider
        .complete(request(vec![Message::user_text("run ls")]))
        .await
        .unwrap();
    assert!(second.is_tool_use());
    assert_eq!(second.tool_uses()[0].1, "Bash");
}

#[tokio::test]
async fn scripted_provider_records_requests() {
    let provider = ScriptedProvider::new(vec![text_response("ack", "end_turn")]);
    let req = request(vec![Message::user_text("ping")]);
    provider.complete(req).await.unwrap();

    let recorded = provider.requests();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].messages.len(), 1);
    assert_eq!(recorded[0].messages[0].role, Role::User);
}

#[tokio::test]
async fn scripted_provider_errors_when_exhausted() {
    let provider = ScriptedProvider::new(vec![text_response("only one", "end_turn")]);
    provider
        .complete(request(vec![Message::user_text("first")]))
        .await
        .unwrap();

    let err = provider
        .complete(request(vec![Message::user_text("second")]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("exhausted"));
}
