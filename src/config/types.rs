//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/docdrift/) and project (.docdrift/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ai::provider::EngineConfig;
use crate::ai::retry::RetryPolicy;
use crate::constants::{engine, network, retry};
use crate::types::{DriftError, Result};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Roots to aggregate
    pub paths: PathsConfig,

    /// Reasoning engine settings
    pub engine: EngineSettings,

    /// Retry settings for engine calls
    pub retry: RetryConfig,

    /// Prompt template settings
    pub prompt: PromptConfig,

    /// Tree walk settings
    pub aggregation: AggregationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            paths: PathsConfig::default(),
            engine: EngineSettings::default(),
            retry: RetryConfig::default(),
            prompt: PromptConfig::default(),
            aggregation: AggregationConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DriftError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        let endpoint = url::Url::parse(&self.engine.endpoint).map_err(|e| {
            DriftError::Config(format!(
                "engine.endpoint is not a valid URL ({}): {}",
                self.engine.endpoint, e
            ))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(DriftError::Config(format!(
                "engine.endpoint must use http or https, got {}",
                endpoint.scheme()
            )));
        }

        if self.engine.model.trim().is_empty() {
            return Err(DriftError::Config("engine.model must not be empty".to_string()));
        }

        if self.engine.max_tokens == 0 {
            return Err(DriftError::Config(
                "engine.max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.engine.timeout_secs == 0 {
            return Err(DriftError::Config(
                "engine.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.engine.api_key_env.trim().is_empty() {
            return Err(DriftError::Config(
                "engine.api_key_env must name an environment variable".to_string(),
            ));
        }

        if self.retry.factor < 1.0 {
            return Err(DriftError::Config(format!(
                "retry.factor must be at least 1.0, got {}",
                self.retry.factor
            )));
        }

        if Duration::from_millis(self.retry.min_delay_ms)
            > Duration::from_secs(self.retry.max_delay_secs)
        {
            return Err(DriftError::Config(
                "retry.min_delay_ms must not exceed retry.max_delay_secs".to_string(),
            ));
        }

        for pattern in &self.aggregation.exclude {
            glob::Pattern::new(pattern).map_err(|e| {
                DriftError::Config(format!("Invalid exclude pattern '{}': {}", pattern, e))
            })?;
        }

        Ok(())
    }
}

// =============================================================================
// Paths
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source code tree
    pub source_root: PathBuf,

    /// Cross-service (project level) specifications
    pub project_docs_root: PathBuf,

    /// Per-service (component level) specifications
    pub component_docs_root: PathBuf,

    /// Organization-wide standards; optional
    pub organization_docs_root: Option<PathBuf>,

    /// Prefix stripped from file paths shown to the engine.
    /// Defaults to each walked root.
    pub display_root: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("source-code"),
            project_docs_root: PathBuf::from("project-docs"),
            component_docs_root: PathBuf::from("component-docs"),
            organization_docs_root: None,
            display_root: None,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Messages API endpoint
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Value of the `anthropic-version` header
    pub api_version: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Environment variable holding the API key. The key itself is never
    /// stored in configuration.
    pub api_key_env: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            endpoint: engine::DEFAULT_ENDPOINT.to_string(),
            model: engine::DEFAULT_MODEL.to_string(),
            max_tokens: engine::DEFAULT_MAX_TOKENS,
            api_version: engine::API_VERSION.to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            api_key_env: engine::DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl EngineSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve into a client configuration, reading the key from the environment
    pub fn resolve(&self) -> Result<EngineConfig> {
        let api_key = EngineConfig::key_from_env(&self.api_key_env)?;
        Ok(EngineConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            api_version: self.api_version.clone(),
            timeout: self.timeout(),
            api_key,
        })
    }
}

// =============================================================================
// Retry
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts after the first one; 0 disables retries
    pub max_retries: usize,
    pub min_delay_ms: u64,
    pub max_delay_secs: u64,
    pub factor: f32,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: retry::DEFAULT_MAX_RETRIES,
            min_delay_ms: retry::BASE_DELAY_MS,
            max_delay_secs: retry::MAX_DELAY_SECS,
            factor: retry::BACKOFF_FACTOR,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            min_delay: Duration::from_millis(self.min_delay_ms),
            max_delay: Duration::from_secs(self.max_delay_secs),
            factor: self.factor,
            jitter: self.jitter,
        }
    }
}

// =============================================================================
// Prompt & Aggregation
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Custom drift template; the built-in one is used when unset
    pub template_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Glob patterns (matched against `/`-relative paths) to leave out
    pub exclude: Vec<String>,

    /// Reject findings that reference no aggregated file
    pub check_references: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            check_references: true,
        }
    }
}
