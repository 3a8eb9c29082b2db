//! Forms error types

use erp_common::EntityId;
use thiserror::Error;

use crate::domain::services::{DropError, FieldErrors};
use crate::ports::GatewayError;

#[derive(Error, Debug)]
pub enum FormsError {
    #[error("no form loaded")]
    NoFormLoaded,

    #[error("form {0} is not published")]
    NotPublished(EntityId),

    #[error("field not found: {0}")]
    FieldNotFound(EntityId),

    #[error("subform not found: {0}")]
    SubformNotFound(EntityId),

    #[error("section not found: {0}")]
    SectionNotFound(EntityId),

    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error(transparent)]
    Drop(#[from] DropError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub type Result<T> = std::result::Result<T, FormsError>;
