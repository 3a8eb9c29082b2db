//! Domain module

pub mod matrix;
pub mod value_objects;

pub use matrix::{pending_key, PendingChange, PermissionMatrix, SavePlan};
pub use value_objects::*;
