//! Error types for the Safetrade escrow services
//!
//! Provides the unified error taxonomy shared by every component: the
//! authorization gate, the escrow workflow, and the query service all
//! surface failures through [`EscrowError`].

use thiserror::Error;

/// Result type alias using EscrowError
pub type Result<T> = std::result::Result<T, EscrowError>;

/// Unified error type for escrow administration operations
#[derive(Debug, Error)]
pub enum EscrowError {
    /// No valid caller identity could be resolved from the credential
    #[error("Authentication required")]
    Unauthenticated,

    /// The caller resolved to an identity without the administrator role
    #[error("Admin access required")]
    Forbidden,

    /// The referenced escrow record or its owning transaction does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input (bad id, unknown status value, missing parameter)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The underlying data store failed for a reason other than not-found
    #[error("{0}")]
    Dependency(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// Implement From for common external error types
impl From<serde_json::Error> for EscrowError {
    fn from(err: serde_json::Error) -> Self {
        EscrowError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for EscrowError {
    fn from(err: anyhow::Error) -> Self {
        EscrowError::Internal(err.to_string())
    }
}
