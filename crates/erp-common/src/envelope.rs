//! API response envelope

use serde::{Deserialize, Serialize};

use crate::error::{ErpError, ErpResult};

/// Standard API response: `{success, data?, error?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the backend accepted the request
    pub success: bool,
    /// Payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error detail on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Error detail; the backend sends either a bare string or `{code?, message}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    /// Plain message
    Message(String),
    /// Structured error
    Detailed {
        /// Machine-readable code
        #[serde(default)]
        code: Option<String>,
        /// Human-readable message
        message: String,
    },
}

impl ErrorBody {
    /// Human-readable message
    pub fn message(&self) -> &str {
        match self {
            Self::Message(m) => m,
            Self::Detailed { message, .. } => message,
        }
    }
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    /// Failed response carrying an error message
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody::Detailed {
                code: Some(code.to_string()),
                message: message.to_string(),
            }),
        }
    }

    /// Unwrap the envelope into its payload
    ///
    /// A `success: false` envelope becomes [`ErpError::Rejected`]; a
    /// successful envelope without data becomes [`ErpError::MissingData`].
    pub fn into_result(self) -> ErpResult<T> {
        if !self.success {
            let message = self
                .error
                .map(|e| e.message().to_string())
                .unwrap_or_else(|| "request rejected".to_string());
            return Err(ErpError::Rejected(message));
        }
        self.data.ok_or(ErpError::MissingData)
    }
}
