//! Layered configuration resolution (§6).
//!
//! Precedence, highest first: the `env` object of `<home>/.claude/settings.json`,
//! then process environment variables, then hard-coded defaults. A malformed
//! settings file degrades to defaults rather than aborting startup; the caller
//! reports `config_error` to the UI exactly once.

use crate::types::MIN_THINKING_TOKENS;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
const DEFAULT_MAX_THINKING_TOKENS: u32 = 4096;

/// Resolved configuration values, independently sourced through the
/// precedence chain described above.
#[derive(Debug, Clone)]
pub struct Settings {
    pub anthropic_auth_token: Option<String>,
    pub anthropic_base_url: String,
    pub anthropic_model: String,
    pub max_thinking_tokens: u32,
    /// Set when a settings file existed but failed to parse.
    pub config_error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    env: SettingsEnv,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsEnv {
    #[serde(rename = "ANTHROPIC_AUTH_TOKEN")]
    anthropic_auth_token: Option<String>,
    #[serde(rename = "ANTHROPIC_BASE_URL")]
    anthropic_base_url: Option<String>,
    #[serde(rename = "ANTHROPIC_MODEL")]
    anthropic_model: Option<String>,
    #[serde(rename = "MAX_THINKING_TOKENS")]
    max_thinking_tokens: Option<serde_json::Value>,
}

impl Settings {
    /// Resolve settings from `<home>/.claude/settings.json`, the process
    /// environment, and defaults.
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".claude")
            .join("settings.json")
    }

    /// Resolve settings from a specific settings-file path. Exposed for tests.
    pub fn load_from(path: PathBuf) -> Self {
        let (file_env, config_error) = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<SettingsFile>(&content) {
                Ok(parsed) => (Some(parsed.env), None),
                Err(e) => (
                    None,
                    Some(format!("malformed settings file {}: {e}", path.display())),
                ),
            },
            Err(_) => (None, None),
        };

        let anthropic_auth_token = file_env
            .as_ref()
            .and_then(|e| e.anthropic_auth_token.clone())
            .or_else(|| std::env::var("ANTHROPIC_AUTH_TOKEN").ok())
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok());

        let anthropic_base_url = file_env
            .as_ref()
            .and_then(|e| e.anthropic_base_url.clone())
            .or_else(|| std::env::var("ANTHROPIC_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let anthropic_model = file_env
            .as_ref()
            .and_then(|e| e.anthropic_model.clone())
            .or_else(|| std::env::var("ANTHROPIC_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let thinking_raw = file_env
            .as_ref()
            .and_then(|e| e.max_thinking_tokens.clone())
            .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .or_else(|| {
                std::env::var("MAX_THINKING_TOKENS")
                    .ok()
                    .and_then(|s| s.parse().ok())
            });

        let max_thinking_tokens = thinking_raw
            .map(|n| n as u32)
            .unwrap_or(DEFAULT_MAX_THINKING_TOKENS)
            .max(MIN_THINKING_TOKENS);

        Self {
            anthropic_auth_token,
            anthropic_base_url,
            anthropic_model,
            max_thinking_tokens,
            config_error,
        }
    }
}
