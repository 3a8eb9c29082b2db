//! HR error types

use erp_common::{EntityId, ErpError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HrError {
    #[error("employee not found: {0}")]
    EmployeeNotFound(EntityId),

    #[error("employee {0} is not active")]
    EmployeeInactive(EntityId),

    #[error("invalid salary figures for employee {0}")]
    InvalidSalary(String),

    #[error("invalid pay period: {0}")]
    InvalidPeriod(String),

    #[error(transparent)]
    Gateway(#[from] ErpError),
}

pub type Result<T> = std::result::Result<T, HrError>;
