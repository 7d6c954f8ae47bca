//! Reasoning Engine Abstraction
//!
//! Defines the `ReasoningEngine` trait: one prompt in, one text answer out.
//! Every engine returns `EngineResponse` with token usage and timing so the
//! run metadata can record what a drift analysis cost.

mod anthropic;

pub use anthropic::AnthropicClient;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{engine, network};
use crate::types::{DriftError, Result};

// =============================================================================
// Engine Response
// =============================================================================

/// Complete engine answer with usage metrics
#[derive(Debug, Clone)]
pub struct EngineResponse {
    /// Text of the first content block
    pub text: String,
    pub usage: TokenUsage,
    pub timing: ResponseTiming,
    pub metadata: ResponseMetadata,
}

/// Token usage reported by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseTiming {
    /// Wall clock time of the call in milliseconds
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Which engine answered
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
    /// Message id assigned by the engine, when it sends one
    pub response_id: Option<String>,
    pub stop_reason: Option<String>,
}

/// Shared engine type for the pipeline
pub type SharedEngine = Arc<dyn ReasoningEngine>;

// =============================================================================
// Engine Configuration
// =============================================================================

/// Everything needed to reach the engine, resolved once per run.
///
/// The API key is held as `SecretString` and redacted in debug output.
#[derive(Clone)]
pub struct EngineConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_version: String,
    pub timeout: Duration,
    pub api_key: SecretString,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl EngineConfig {
    /// Defaults with an explicit key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: engine::DEFAULT_ENDPOINT.to_string(),
            model: engine::DEFAULT_MODEL.to_string(),
            max_tokens: engine::DEFAULT_MAX_TOKENS,
            api_version: engine::API_VERSION.to_string(),
            timeout: Duration::from_secs(network::DEFAULT_TIMEOUT_SECS),
            api_key: SecretString::from(api_key.into()),
        }
    }

    /// Read the key from the named environment variable
    pub fn key_from_env(var: &str) -> Result<SecretString> {
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(SecretString::from(key)),
            _ => Err(DriftError::Config(format!(
                "API key not found. Set the {} environment variable",
                var
            ))),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Reasoning Engine Trait
// =============================================================================

#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Send one prompt and return the engine's text answer.
    ///
    /// Makes exactly one outbound request; callers wanting retries wrap the
    /// engine in `RetryingEngine`.
    async fn complete(&self, prompt: &str) -> Result<EngineResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Where requests go
    fn endpoint(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_debug_redacts_key() {
        let config = EngineConfig::new("sk-ant-very-secret");
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-ant-very-secret"));
        assert!(debug.contains(engine::DEFAULT_MODEL));
    }

    #[test]
    fn test_missing_env_key_is_config_error() {
        let result = EngineConfig::key_from_env("DOCDRIFT_TEST_KEY_THAT_IS_NEVER_SET");
        assert!(matches!(result, Err(DriftError::Config(msg)) if msg.contains("DOCDRIFT_TEST_KEY_THAT_IS_NEVER_SET")));
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            input_tokens: 1200,
            output_tokens: 300,
        };
        assert_eq!(usage.total(), 1500);

        let huge = TokenUsage {
            input_tokens: u32::MAX,
            output_tokens: 10,
        };
        assert_eq!(huge.total(), u32::MAX);
    }
}
