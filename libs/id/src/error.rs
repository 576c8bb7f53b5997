//! Error types for identifier parsing.

use thiserror::Error;

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The identifier string is empty.
    #[error("identifier cannot be empty")]
    Empty,

    /// The UUID portion of the identifier is invalid.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),
}

impl IdError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, IdError::Empty)
    }
}
