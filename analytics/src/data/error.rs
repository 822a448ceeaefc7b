//! Unified error type for store collaborators

use thiserror::Error;

/// Error surfaced by the indexing store or the address directory.
///
/// Failures are propagated to the caller as-is; this layer never retries.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The record collection backend failed
    #[error("store backend error: {0}")]
    Backend(String),

    /// The address directory failed
    #[error("address directory error: {0}")]
    Directory(String),

    /// Query timed out on the backend
    #[error("query timeout after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl StoreError {
    /// Create a backend error with preserved context
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend(reason.into())
    }

    /// Create a directory error with preserved context
    pub fn directory(reason: impl Into<String>) -> Self {
        Self::Directory(reason.into())
    }

    /// Check if this error might clear on retry by an outer layer
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
