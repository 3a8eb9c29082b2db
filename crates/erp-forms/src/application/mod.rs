//! Application layer
//!
//! Orchestrates builder and runtime use cases over the gateway port.

pub mod builder;
pub mod dto;
pub mod runtime;

pub use builder::FormBuilderService;
pub use dto::*;
pub use runtime::FormRuntimeService;
