//! Reasoning engine integration
//!
//! Prompt assembly, the Anthropic Messages client, retry and timeout
//! wrappers, and recovery of JSON from free-form answers.

pub mod prompt;
pub mod provider;
pub mod retry;
pub mod timeout;
pub mod validation;

pub use prompt::{DriftPromptInputs, PromptTemplate, assemble, load_drift_template};
pub use provider::{
    AnthropicClient, EngineConfig, EngineResponse, ReasoningEngine, ResponseMetadata,
    ResponseTiming, SharedEngine, TokenUsage,
};
pub use retry::{RetryPolicy, RetryingEngine};
pub use timeout::with_timeout;
pub use validation::{ExtractionSource, JsonExtractor, extract_json_object};
