//! Infrastructure layer

pub mod persistence;

pub use persistence::InMemoryPermissionGateway;
