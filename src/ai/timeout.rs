//! Timeout guard for async operations
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let response = with_timeout(
//!     Duration::from_secs(300),
//!     async { engine.complete(&prompt).await },
//!     "engine request",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{DriftError, Result};

/// Execute an async operation with a timeout
///
/// Returns `DriftError::Timeout` naming `operation_name` if the operation
/// doesn't complete within `timeout`. The inner future is dropped.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DriftError::timeout(operation_name, timeout)),
    }
}
