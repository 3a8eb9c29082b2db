//! Ports module (Hexagonal Architecture)
//!
//! Interfaces to the backend API and to the user-facing notification surface.

pub mod outbound;

pub use outbound::*;
