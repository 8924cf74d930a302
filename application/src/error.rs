//! Error taxonomy shared by all use cases.
//!
//! Each use case has its own `thiserror` enum; every one of them maps onto an
//! [`ErrorKind`] so callers can render a uniform payload.

use crate::ports::llm_gateway::GatewayError;
use crate::ports::transcript_store::StoreError;
use std::fmt;

/// Category of a foreground failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller input was missing or malformed.
    Validation,
    /// The referenced conversation does not exist.
    NotFound,
    /// No credential for the resolved provider.
    MissingCredential,
    /// The provider failed or timed out before producing output.
    Provider,
    /// The model answered, but not with parseable structured output.
    Extraction,
    /// The transcript store failed.
    Persistence,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::MissingCredential => "missing_credential",
            ErrorKind::Provider => "provider",
            ErrorKind::Extraction => "extraction",
            ErrorKind::Persistence => "persistence",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::MissingCredential(_) => ErrorKind::MissingCredential,
            GatewayError::Provider(_) | GatewayError::Timeout => ErrorKind::Provider,
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Backend(_) => ErrorKind::Persistence,
            StoreError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}
