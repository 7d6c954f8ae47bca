//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers and wire strings should be defined here.

/// Reasoning engine (Anthropic Messages API) defaults
pub mod engine {
    /// Completions endpoint
    pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

    /// Model identifier sent with every request
    pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

    /// Value of the `anthropic-version` protocol header
    pub const API_VERSION: &str = "2023-06-01";

    /// Maximum output tokens requested from the engine
    pub const DEFAULT_MAX_TOKENS: u32 = 8192;

    /// Environment variable holding the API credential
    pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

    /// Provider name used in logs and run metadata
    pub const PROVIDER_NAME: &str = "anthropic";
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds); drift analysis of a large prompt
    /// routinely takes tens of seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}

/// Retry constants for engine calls
pub mod retry {
    /// Default maximum retries after the first attempt
    pub const DEFAULT_MAX_RETRIES: usize = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// Aggregated text formats
pub mod bundle {
    /// Opening tag of the single source container
    pub const SOURCE_OPEN: &str = "<source_files>";

    /// Closing tag of the single source container
    pub const SOURCE_CLOSE: &str = "</source_files>";

    /// Indentation of a `<file>` block inside the container
    pub const FILE_INDENT: &str = "    ";

    /// Indentation of file content inside a `<file>` block
    pub const CONTENT_INDENT: &str = "        ";
}

/// Prompt template markers
pub mod prompt {
    pub const SOURCE_FILES: &str = "SOURCE_FILES";
    pub const PROJECT_DOCUMENTATION: &str = "PROJECT_DOCUMENTATION";
    pub const COMPONENT_DOCUMENTATION: &str = "COMPONENT_DOCUMENTATION";
    pub const ORGANIZATION_DOCUMENTATION: &str = "ORGANIZATION_DOCUMENTATION";

    /// Markers every drift template must carry
    pub const REQUIRED_MARKERS: [&str; 3] =
        [SOURCE_FILES, PROJECT_DOCUMENTATION, COMPONENT_DOCUMENTATION];
}
