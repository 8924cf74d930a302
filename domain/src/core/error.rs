//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model output is missing segments: {}", .0.join(", "))]
    MissingSegments(Vec<String>),
}

impl DomainError {
    /// Check if this error was caused by caller input rather than model output
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, DomainError::InvalidRequest(_))
    }
}
