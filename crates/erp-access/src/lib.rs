//! OpenERP Access
//!
//! Admin permission matrix: role- and user-level grants over modules and
//! forms, unsaved edits keyed per cell, and a two-request bulk save.
//!
//! ## Architecture
//!
//! - **Domain Layer**: `PermissionMatrix` aggregate and grant rows
//! - **Application Layer**: `PermissionService` load/save orchestration
//! - **Ports Layer**: `PermissionGateway`
//! - **Infrastructure Layer**: in-memory gateway

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use application::{LoadReport, PartitionOutcome, PermissionService, SaveOutcome};
pub use domain::{
    Grants, Module, PermissionKind, PermissionMatrix, Resource, Role, RolePermission, Subject,
    User, UserPermission,
};
pub use error::{AccessError, Result};
pub use ports::PermissionGateway;
