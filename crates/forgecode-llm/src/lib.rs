//! Non-streaming client for the Anthropic Messages API.

pub mod anthropic;
pub mod mock;
pub mod provider;
pub mod types;

pub use anthropic::AnthropicProvider;
pub use mock::ScriptedProvider;
pub use provider::{LlmError, LlmProvider};
pub use types::*;
