//! Anthropic Messages API Client
//!
//! One POST per `complete` call. Errors keep the HTTP status and the raw
//! response body so an operator can see why the engine refused a request.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use super::{
    EngineConfig, EngineResponse, ReasoningEngine, ResponseMetadata, ResponseTiming, TokenUsage,
};
use crate::ai::timeout::with_timeout;
use crate::constants::{engine, network};
use crate::types::{AnalysisError, DriftError, Result};

/// Anthropic client with secure API key handling
pub struct AnthropicClient {
    config: EngineConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("config", &self.config)
            .finish()
    }
}

impl AnthropicClient {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(
                config
                    .timeout
                    .min(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS)),
            )
            .build()
            .map_err(|e| {
                DriftError::analysis(
                    &config.endpoint,
                    AnalysisError::Transport(format!("Failed to create HTTP client: {}", e)),
                )
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn fail(&self, source: AnalysisError) -> DriftError {
        DriftError::analysis(&self.config.endpoint, source)
    }

    async fn send(&self, prompt: &str) -> Result<EngineResponse> {
        let start_time = Instant::now();
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!("Sending request to {}", self.config.endpoint);

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", &self.config.api_version)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.fail(AnalysisError::from(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text().await);
            warn!(status = status.as_u16(), "Engine rejected request");
            return Err(self.fail(AnalysisError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| self.fail(AnalysisError::Decode(e.to_string())))?;
        let elapsed = start_time.elapsed();

        // Thinking or tool blocks may precede the answer; the first text block is it.
        let text = body
            .content
            .into_iter()
            .find_map(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| self.fail(AnalysisError::NoContent))?;

        let usage = body
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            })
            .unwrap_or_default();

        info!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            elapsed_ms = elapsed.as_millis() as u64,
            "Engine answered"
        );

        Ok(EngineResponse {
            text,
            usage,
            timing: ResponseTiming::from_duration(elapsed),
            metadata: ResponseMetadata {
                model: body.model.unwrap_or_else(|| self.config.model.clone()),
                provider: engine::PROVIDER_NAME.to_string(),
                response_id: body.id,
                stop_reason: body.stop_reason,
            },
        })
    }
}

#[async_trait]
impl ReasoningEngine for AnthropicClient {
    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_bytes = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<EngineResponse> {
        with_timeout(self.config.timeout, self.send(prompt), "engine request").await
    }

    fn name(&self) -> &str {
        engine::PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [RequestMessage<'a>; 1],
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Error body text; a body that cannot be read is reported as such, never as empty
fn error_body(body: reqwest::Result<String>) -> String {
    body.unwrap_or_else(|e| format!("<unreadable body: {}>", e))
}

#[derive(Deserialize)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}
