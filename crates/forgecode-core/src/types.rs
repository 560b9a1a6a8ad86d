//! Message and conversation data model.
//!
//! Messages are block-based rather than flat strings: a single assistant
//! turn can carry thinking, text, and one or more tool-use blocks, and the
//! reply carries one tool-result block per tool-use id. This mirrors the
//! shape the Anthropic Messages API actually speaks on the wire, so the LLM
//! provider and the turn loop share one representation with no translation
//! step between them.

use serde::{Deserialize, Serialize};

/// Message role. Only `user` and `assistant` appear in a conversation; the
/// system prompt is carried out-of-band on the request, not as a message.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of message content.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Thinking { thinking: String },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

impl ContentBlock {
    pub fn text(s: impl Into<String>) -> Self {
        ContentBlock::Text { text: s.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_tool_use(&self) -> Option<(&str, &str, &serde_json::Value)> {
        match self {
            ContentBlock::ToolUse { id, name, input } => Some((id, name, input)),
            _ => None,
        }
    }
}

/// A message in a conversation: a role plus an ordered sequence of content blocks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn user_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: blocks,
        }
    }

    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: blocks,
        }
    }

    /// All tool-use blocks present in this message, in emission order.
    pub fn tool_uses(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        self.content.iter().filter_map(ContentBlock::as_tool_use).collect()
    }

    /// First text block's contents, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(ContentBlock::as_text)
    }
}

/// An ordered, append-only list of messages owned by exactly one agent.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// A tool definition as advertised to the model: name, description, and a
/// JSON-schema-shaped input descriptor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Immutable agent configuration, resolved once at construction via the
/// layered settings chain (see `forgecode_core::config`).
#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub model: String,
    pub max_thinking_tokens: u32,
    pub api_key: String,
    pub base_url: String,
    pub workdir: std::path::PathBuf,
}

impl AgentConfig {
    /// `max_thinking_tokens` below the floor is clamped up, matching the
    /// configuration precedence rule's clamp-to-minimum behavior.
    pub fn clamp_thinking_tokens(tokens: u32) -> u32 {
        tokens.max(MIN_THINKING_TOKENS)
    }
}

pub const MIN_THINKING_TOKENS: u32 = 1024;
