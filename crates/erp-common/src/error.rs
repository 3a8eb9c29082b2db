//! Error types shared across OpenERP crates

use thiserror::Error;

/// Shared error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErpError {
    /// Backend answered `success: false`
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Backend answered `success: true` without a payload
    #[error("no data in response")]
    MissingData,

    /// Entity lookup failed
    #[error("not found: {0}")]
    NotFound(String),

    /// Input failed validation
    #[error("validation failed: {0}")]
    Validation(String),

    /// Transport or decoding failure
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type for shared operations
pub type ErpResult<T> = Result<T, ErpError>;
