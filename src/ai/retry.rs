//! Bounded retry around a reasoning engine
//!
//! Only failures whose category is retryable (rate limit, 5xx, transport,
//! timeout) are attempted again. Everything else surfaces on the first try.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tracing::warn;

use super::provider::{EngineResponse, ReasoningEngine};
use crate::constants::retry;
use crate::types::{DriftError, Result};

/// Backoff parameters for engine calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts after the first one; 0 disables retries
    pub max_retries: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub factor: f32,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: retry::DEFAULT_MAX_RETRIES,
            min_delay: Duration::from_millis(retry::BASE_DELAY_MS),
            max_delay: Duration::from_secs(retry::MAX_DELAY_SECS),
            factor: retry::BACKOFF_FACTOR,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.factor)
            .with_max_times(self.max_retries);
        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

/// Engine wrapper adding exponential backoff
pub struct RetryingEngine<E> {
    inner: E,
    policy: RetryPolicy,
}

impl<E: ReasoningEngine> RetryingEngine<E> {
    pub fn new(inner: E, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E: ReasoningEngine> ReasoningEngine for RetryingEngine<E> {
    async fn complete(&self, prompt: &str) -> Result<EngineResponse> {
        (|| async { self.inner.complete(prompt).await })
            .retry(self.policy.backoff())
            .when(|err: &DriftError| err.is_retryable())
            .notify(|err: &DriftError, delay: Duration| {
                warn!(
                    engine = self.inner.name(),
                    "Engine call failed, retrying in {:?}: {}", delay, err
                );
            })
            .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{
        AnthropicClient, EngineConfig, ResponseMetadata, ResponseTiming, TokenUsage,
    };
    use crate::types::AnalysisError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails with the given statuses in order, then answers
    struct ScriptedEngine {
        failures: Vec<u16>,
        calls: AtomicUsize,
    }

    impl ScriptedEngine {
        fn new(failures: Vec<u16>) -> Self {
            Self {
                failures,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReasoningEngine for ScriptedEngine {
        async fn complete(&self, _prompt: &str) -> Result<EngineResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = self.failures.get(call) {
                return Err(DriftError::analysis(
                    "scripted",
                    AnalysisError::Status {
                        status: *status,
                        body: String::new(),
                    },
                ));
            }
            Ok(EngineResponse {
                text: "ok".to_string(),
                usage: TokenUsage::default(),
                timing: ResponseTiming::default(),
                metadata: ResponseMetadata::default(),
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        fn endpoint(&self) -> &str {
            "scripted"
        }
    }

    fn fast_policy(max_retries: usize) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            factor: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn test_retries_rate_limit_then_succeeds() {
        let engine = RetryingEngine::new(ScriptedEngine::new(vec![429, 503]), fast_policy(3));
        let response = engine.complete("prompt").await.unwrap();
        assert_eq!(response.text, "ok");
        assert_eq!(engine.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_not_retried() {
        let engine = RetryingEngine::new(ScriptedEngine::new(vec![401]), fast_policy(3));
        let err = engine.complete("prompt").await.unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(engine.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let engine = RetryingEngine::new(
            ScriptedEngine::new(vec![500, 500, 500, 500, 500]),
            fast_policy(2),
        );
        assert!(engine.complete("prompt").await.is_err());
        assert_eq!(engine.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_disables_retry() {
        let engine = RetryingEngine::new(ScriptedEngine::new(vec![429]), fast_policy(0));
        assert!(engine.complete("prompt").await.is_err());
        assert_eq!(engine.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_against_http_engine() {
        use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "{}"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = EngineConfig::new("key").with_endpoint(format!("{}/v1/messages", server.uri()));
        let engine = RetryingEngine::new(AnthropicClient::new(config).unwrap(), fast_policy(3));
        let response = engine.complete("prompt").await.unwrap();
        assert_eq!(response.text, "{}");
        assert_eq!(engine.name(), "anthropic");
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(RetryPolicy::disabled().max_retries, 0);
    }
}
