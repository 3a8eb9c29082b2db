//! Infrastructure layer
//!
//! In-memory adapters. The HTTP adapter lives in `erp-sdk`.

pub mod notify;
pub mod persistence;

pub use notify::{CollectingNotifier, LogNotifier};
pub use persistence::{GatewayCall, InMemoryFormGateway};
