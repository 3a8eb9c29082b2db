//! Access error types

use erp_common::{EntityId, ErpError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("unknown role: {0}")]
    UnknownRole(EntityId),

    #[error("unknown user: {0}")]
    UnknownUser(EntityId),

    #[error(transparent)]
    Gateway(#[from] ErpError),
}

pub type Result<T> = std::result::Result<T, AccessError>;
