//! Non-streaming Anthropic Messages API client (§4.11).

use crate::provider::{LlmError, LlmProvider};
use crate::types::{LlmRequest, LlmResponse, Usage};
use forgecode_core::{ContentBlock, Message, ToolDefinition};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: &'a [ToolDefinition],
    max_tokens: u32,
    thinking: WireThinking,
}

#[derive(Serialize)]
struct WireThinking {
    #[serde(rename = "type")]
    kind: &'static str,
    budget_tokens: u32,
}

#[derive(Deserialize)]
struct WireResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Deserialize)]
struct WireErrorBody {
    error: WireErrorDetail,
}

#[derive(Deserialize)]
struct WireErrorDetail {
    message: String,
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = WireRequest {
            model: &request.model,
            system: request.system.as_deref(),
            messages: &request.messages,
            tools: &request.tools,
            max_tokens: request.max_tokens,
            thinking: WireThinking {
                kind: "enabled",
                budget_tokens: request.thinking_budget_tokens,
            },
        };

        debug!(model = %request.model, messages = request.messages.len(), "dispatching Anthropic request");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::TransportFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<WireErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            return match status.as_u16() {
                401 => Err(LlmError::AuthenticationFailed(message)),
                429 => Err(LlmError::RateLimited),
                _ => {
                    warn!(%status, %message, "Anthropic request failed");
                    Err(LlmError::TransportFailure(format!("{status}: {message}")))
                }
            };
        }

        let parsed: WireResponse = response
            .json()
            .await
            .map_err(|e| LlmError::TransportFailure(e.to_string()))?;

        Ok(LlmResponse {
            content: parsed.content,
            stop_reason: parsed.stop_reason.unwrap_or_else(|| "end_turn".to_string()),
            usage: parsed
                .usage
                .map(|u| Usage {
                    input_tokens: u.input_tokens,
                    output_tokens: u.output_tokens,
                })
                .unwrap_or_default(),
        })
    }
}
