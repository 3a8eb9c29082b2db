//! Client error types

use erp_common::ErpError;
use erp_forms::GatewayError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection, timeout or protocol failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Response body was not the expected JSON
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Envelope answered `success: false`
    #[error("rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Non-2xx response without an envelope
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// Envelope answered `success: true` without data
    #[error("no data in response")]
    MissingData,

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl From<ApiError> for ErpError {
    fn from(err: ApiError) -> Self {
        if err.is_not_found() {
            return ErpError::NotFound(err.to_string());
        }
        match err {
            ApiError::Rejected { status: 400 | 422, message } => ErpError::Validation(message),
            ApiError::Rejected { message, .. } => ErpError::Rejected(message),
            ApiError::Status { status, message } if status < 500 => ErpError::Rejected(message),
            ApiError::MissingData => ErpError::MissingData,
            other => ErpError::Transport(other.to_string()),
        }
    }
}

impl From<ApiError> for GatewayError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Decode(e) => GatewayError::Decode(e.to_string()),
            other => ErpError::from(other).into(),
        }
    }
}
