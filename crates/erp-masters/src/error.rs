//! Master data error types

use erp_common::{EntityId, ErpError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MasterError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("{kind} code already exists: {code}")]
    DuplicateCode { kind: &'static str, code: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: EntityId },

    #[error(transparent)]
    Storage(#[from] ErpError),
}

impl MasterError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid { field, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, MasterError>;
