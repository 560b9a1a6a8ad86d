//! Request/response types for a single, non-streaming model call.
//!
//! There is no partial-delta type anywhere in this crate: `complete()` always
//! returns a fully assembled [`LlmResponse`] (§1 Non-goals exclude intra-response
//! streaming, so there is nothing for a delta type to model).

use forgecode_core::{ContentBlock, Message, ToolDefinition};

/// A single outgoing request to the model.
#[derive(Clone, Debug)]
pub struct LlmRequest {
    pub model: String,
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub max_tokens: u32,
    /// Thinking budget in tokens; already clamped to `MIN_THINKING_TOKENS` by
    /// the caller via `AgentConfig::clamp_thinking_tokens`.
    pub thinking_budget_tokens: u32,
}

/// Token usage reported alongside a response.
#[derive(Clone, Copy, Debug, Default)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The complete, fully-assembled model response to one request.
#[derive(Clone, Debug)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    /// Verbatim `stop_reason` from the API — never hard-coded by the loop.
    pub stop_reason: String,
    pub usage: Usage,
}

impl LlmResponse {
    pub fn is_tool_use(&self) -> bool {
        self.stop_reason == "tool_use"
    }

    /// Tool-use blocks in emission order.
    pub fn tool_uses(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        self.content
            .iter()
            .filter_map(ContentBlock::as_tool_use)
            .collect()
    }

    /// Thinking blocks, in order, each paired with the (unknown) duration the
    /// caller attaches for UI display.
    pub fn thinking_blocks(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Thinking { thinking } => Some(thinking.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text blocks concatenated in order.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}
