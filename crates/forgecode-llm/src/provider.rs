//! The model-transport seam: a non-streaming `complete()` call that any
//! implementation — real Anthropic client or test double — can satisfy.

use crate::types::{LlmRequest, LlmResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("rate limited")]
    RateLimited,

    #[error("transport failure: {0}")]
    TransportFailure(String),
}

/// A single complete call: request in, fully assembled response out. No
/// partial-delta type exists anywhere in this crate (§1 Non-goals exclude
/// intra-response streaming).
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}
