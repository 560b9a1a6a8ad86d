//! A scripted [`LlmProvider`] double. Not used by the real binary — it exists
//! so the turn loop and subagent runner can be exercised end-to-end in tests
//! without a network call, per §4.12's "no network access in tests" rule.

use crate::provider::{LlmError, LlmProvider};
use crate::types::{LlmRequest, LlmResponse};
use std::sync::Mutex;

/// Replays a fixed sequence of responses, one per `complete()` call. Panics
/// if exhausted — tests should script exactly as many turns as they drive.
pub struct ScriptedProvider {
    responses: Mutex<Vec<LlmResponse>>,
    /// Requests observed so far, for assertions about what the loop sent.
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().rev().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| LlmError::TransportFailure("ScriptedProvider exhausted".into()))
    }
}
