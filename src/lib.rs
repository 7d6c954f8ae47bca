//! docdrift - Documentation Drift Detection
//!
//! Compares a source tree against its layered documentation (organization,
//! project and component) by asking a reasoning engine for a structured
//! drift report, then holding that report to a strict result contract.
//!
//! ## Flow
//!
//! 1. [`bundle`] walks the source and documentation trees deterministically
//! 2. [`ai::prompt`] fills the analysis template with the bundles
//! 3. [`ai::provider`] sends the prompt to the Anthropic Messages API,
//!    wrapped in [`ai::retry`] for transient failures
//! 4. [`report`] extracts the JSON answer and validates it into a
//!    [`DriftReport`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use docdrift::{AnthropicClient, DriftPipeline, EngineConfig, RetryPolicy, RetryingEngine, RunConfig};
//!
//! let key = EngineConfig::key_from_env("ANTHROPIC_API_KEY")?;
//! let client = AnthropicClient::new(EngineConfig::new(key.expose_secret()))?;
//! let engine = Arc::new(RetryingEngine::new(client, RetryPolicy::default()));
//! let template = docdrift::ai::load_drift_template(None)?;
//! let config = RunConfig::new("source-code", "project-docs", "component-docs");
//! let run = DriftPipeline::new(config, engine, template).run().await?;
//! println!("{} finding(s)", run.report.results.len());
//! ```

pub mod ai;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod report;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use pipeline::{DriftPipeline, DriftRun, PreparedPrompt, RunConfig};
pub use types::error::{DriftError, ErrorClass, Result};
pub use types::report::{DriftFinding, DriftReport, DriftSummary, Severity};

// =============================================================================
// Engine Re-exports
// =============================================================================

pub use ai::{
    AnthropicClient, EngineConfig, ReasoningEngine, RetryPolicy, RetryingEngine, SharedEngine,
};
