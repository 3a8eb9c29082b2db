//! Application layer

pub mod service;

pub use service::{LoadReport, PartitionOutcome, PermissionService, SaveOutcome};
