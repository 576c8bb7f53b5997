//! Error types for drift detection.

use thiserror::Error;

/// Errors that can occur while collecting or comparing resource state.
#[derive(Debug, Error)]
pub enum ResyncError {
    /// A comparison was configured incorrectly (wrong number of named
    /// collectors, or a diff requested before a subject was supplied).
    #[error("invalid comparison: {reason}")]
    InvalidComparison { reason: String },

    /// An underlying source query failed. Not retried here; the failed
    /// fetch is not cached, so the caller may simply ask again.
    #[error("source query failed: {0}")]
    Source(#[from] anyhow::Error),
}

impl ResyncError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidComparison {
            reason: reason.into(),
        }
    }
}
