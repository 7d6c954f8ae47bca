//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Provides error classification for retry decisions and for the
//! user-facing error class printed by the CLI.
//!
//! ## Error Categories (engine calls)
//!
//! - **RateLimit**: API rate limiting (wait and retry)
//! - **Transient**: Temporary server issues (retry)
//! - **Network**: Connectivity issues (retry with backoff)
//! - **Auth**: Authentication failures (fail fast)
//! - **BadRequest**: Request rejected as invalid (fail fast)
//!
//! ## Error Classes (user facing)
//!
//! Every `DriftError` maps to one of I/O, template, config, transport,
//! contract or internal so the caller can tell what failed and where.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for retry routing of reasoning-engine failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - wait then retry
    RateLimit,
    /// Authentication failed - fail fast, don't retry
    Auth,
    /// Network/connectivity issues - retry with backoff
    Network,
    /// Invalid request - don't retry, fix request
    BadRequest,
    /// Engine answered but the answer is unusable
    ParseError,
    /// Temporary server issues - retry
    Transient,
    /// Unknown error - don't retry
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Check if this category is worth another attempt against the engine
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Network | Self::Transient)
    }

    /// Classify an HTTP status code returned by the engine
    pub fn from_http_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimit,
            401 | 403 => Self::Auth,
            400 | 404 | 413 | 422 => Self::BadRequest,
            408 => Self::Network,
            500..=599 => Self::Transient,
            _ => Self::Unknown,
        }
    }
}

// =============================================================================
// Analysis Error
// =============================================================================

/// Failure of a single reasoning-engine call
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// Engine answered with a non-success status
    #[error("engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request never completed (connect, DNS, TLS, read timeout)
    #[error("transport failure: {0}")]
    Transport(String),

    /// Success status but an empty content array
    #[error("no content in engine response")]
    NoContent,

    /// Success status but the body is not the expected JSON shape
    #[error("failed to decode engine response: {0}")]
    Decode(String),
}

impl AnalysisError {
    /// Retry routing category for this failure
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Status { status, .. } => ErrorCategory::from_http_status(*status),
            Self::Transport(_) => ErrorCategory::Network,
            Self::NoContent | Self::Decode(_) => ErrorCategory::ParseError,
        }
    }

    /// HTTP status, when the engine answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

// =============================================================================
// Contract Violations
// =============================================================================

/// What kind of rule a drift report broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// No JSON object could be extracted from the engine answer
    Extraction,
    /// JSON does not match the report schema (missing field, bad enum value)
    Schema,
    /// Summary counts disagree with each other or with the findings
    Consistency,
    /// Value out of range (line ranges)
    Range,
    /// Two order-aligned arrays disagree
    Alignment,
    /// Finding does not point at any aggregated file
    UnknownReference,
    /// Finding id used more than once
    Duplicate,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Extraction => "extraction",
            Self::Schema => "schema",
            Self::Consistency => "consistency",
            Self::Range => "range",
            Self::Alignment => "alignment",
            Self::UnknownReference => "unknown-reference",
            Self::Duplicate => "duplicate",
        };
        f.write_str(s)
    }
}

/// Structured contract violation with context
#[derive(Debug, Clone)]
pub struct ContractViolation {
    pub kind: ViolationKind,
    /// JSON location of the offending value, e.g. `results[2].location.lineRange`
    pub field: Option<String>,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "[{}] {}: {}", self.kind, field, self.message)?,
            None => write!(f, "[{}] {}", self.kind, self.message)?,
        }
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            write!(f, " (expected {}, got {})", expected, actual)?;
        }
        Ok(())
    }
}

impl ContractViolation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    /// Add field context
    pub fn at(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add expected/actual values
    pub fn with_comparison(
        mut self,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        self.expected = Some(expected.to_string());
        self.actual = Some(actual.to_string());
        self
    }
}

/// All violations found in one engine answer
#[derive(Debug, Clone)]
pub struct ContractError {
    pub violations: Vec<ContractViolation>,
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "drift report rejected with {} violation(s)",
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ContractError {}

impl ContractError {
    pub fn single(violation: ContractViolation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }
}

// =============================================================================
// Error Classes
// =============================================================================

/// User-visible error class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Io,
    Template,
    Config,
    Transport,
    Contract,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Io => "I/O",
            Self::Template => "template",
            Self::Config => "config",
            Self::Transport => "transport",
            Self::Contract => "contract",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DriftError {
    // -------------------------------------------------------------------------
    // Filesystem
    // -------------------------------------------------------------------------
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot walk {}: {message}", root.display())]
    Walk { root: PathBuf, message: String },

    // -------------------------------------------------------------------------
    // Startup
    // -------------------------------------------------------------------------
    #[error("Template error: {0}")]
    Template(String),

    #[error("Config error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Reasoning engine
    // -------------------------------------------------------------------------
    #[error("Analysis error ({endpoint}): {source}")]
    Analysis {
        endpoint: String,
        #[source]
        source: AnalysisError,
    },

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------
    #[error("{0}")]
    Contract(ContractError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Task failed: {0}")]
    Task(String),
}

impl From<ContractError> for DriftError {
    fn from(err: ContractError) -> Self {
        DriftError::Contract(err)
    }
}

impl From<tokio::task::JoinError> for DriftError {
    fn from(err: tokio::task::JoinError) -> Self {
        DriftError::Task(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DriftError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl DriftError {
    /// Create an I/O error bound to the path that caused it
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create an engine error tagged with the endpoint it came from
    pub fn analysis(endpoint: impl Into<String>, source: AnalysisError) -> Self {
        Self::Analysis {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// User-visible class of this error
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Io { .. } | Self::Walk { .. } => ErrorClass::Io,
            Self::Template(_) => ErrorClass::Template,
            Self::Config(_) => ErrorClass::Config,
            Self::Analysis { .. } | Self::Timeout { .. } => ErrorClass::Transport,
            Self::Contract(_) => ErrorClass::Contract,
            Self::Json(_) | Self::Yaml(_) | Self::Task(_) => ErrorClass::Internal,
        }
    }

    /// Check if another engine attempt could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Analysis { source, .. } => source.is_retryable(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
        assert_eq!(ErrorCategory::Transient.to_string(), "TRANSIENT");
    }

    #[test]
    fn test_http_status_classification() {
        assert_eq!(ErrorCategory::from_http_status(429), ErrorCategory::RateLimit);
        assert_eq!(ErrorCategory::from_http_status(401), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_http_status(400), ErrorCategory::BadRequest);
        assert_eq!(ErrorCategory::from_http_status(503), ErrorCategory::Transient);
        assert_eq!(ErrorCategory::from_http_status(529), ErrorCategory::Transient);
        assert_eq!(ErrorCategory::from_http_status(302), ErrorCategory::Unknown);
    }

    #[test]
    fn test_retryable_analysis_errors() {
        let rate_limited = AnalysisError::Status {
            status: 429,
            body: "slow down".to_string(),
        };
        assert!(rate_limited.is_retryable());
        assert!(AnalysisError::Transport("connection reset".to_string()).is_retryable());

        let unauthorized = AnalysisError::Status {
            status: 401,
            body: r#"{"error":"invalid key"}"#.to_string(),
        };
        assert!(!unauthorized.is_retryable());
        assert_eq!(unauthorized.status(), Some(401));
        assert!(!AnalysisError::NoContent.is_retryable());
    }

    #[test]
    fn test_error_classes() {
        let io = DriftError::io(
            "/docs/a.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(io.class(), ErrorClass::Io);
        assert!(io.to_string().contains("/docs/a.md"));

        let engine = DriftError::analysis("https://example.test/v1/messages", AnalysisError::NoContent);
        assert_eq!(engine.class(), ErrorClass::Transport);
        assert!(engine.to_string().contains("example.test"));

        let contract = DriftError::from(ContractError::single(ContractViolation::new(
            ViolationKind::Consistency,
            "totalIssues mismatch",
        )));
        assert_eq!(contract.class(), ErrorClass::Contract);
        assert_eq!(ErrorClass::Transport.to_string(), "transport");
    }

    #[test]
    fn test_contract_violation_display() {
        let violation = ContractViolation::new(ViolationKind::Consistency, "count mismatch")
            .at("summary.totalIssues")
            .with_comparison(3, 4);
        assert_eq!(
            violation.to_string(),
            "[consistency] summary.totalIssues: count mismatch (expected 3, got 4)"
        );

        let err = ContractError::single(violation);
        assert!(err.has_kind(ViolationKind::Consistency));
        assert!(!err.has_kind(ViolationKind::Range));
        assert!(err.to_string().starts_with("drift report rejected with 1 violation(s)"));
    }
}
