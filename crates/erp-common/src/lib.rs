//! OpenERP Common - Shared types for the ERP workspace
//!
//! This crate provides the primitives every bounded context builds on:
//! - Entity identifiers
//! - The `{success, data?, error?}` API envelope
//! - Error handling
//! - Tracing initialisation
//!
//! # Architecture
//!
//! Each domain crate (`erp-forms`, `erp-access`, `erp-hr`, `erp-masters`)
//! follows the same layering:
//! - **Domain**: aggregates, value objects, domain services
//! - **Application**: use case orchestration
//! - **Ports**: traits the infrastructure implements
//! - **Infrastructure**: in-memory adapters; HTTP adapters live in `erp-sdk`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod envelope;
pub mod error;
pub mod id;
pub mod telemetry;

pub use envelope::*;
pub use error::*;
pub use id::*;
