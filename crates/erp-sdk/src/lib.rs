//! OpenERP SDK
//!
//! Async REST client for the OpenERP backend. [`ApiClient`] implements the
//! gateway ports of the domain crates, so services run unchanged against a
//! live server.
//!
//! # Example
//!
//! ```rust,no_run
//! use erp_sdk::{ApiClient, ClientConfig};
//! use erp_forms::FormGateway;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(
//!     ClientConfig::new("https://erp.example.com").with_tenant("acme"),
//! )?;
//! let forms = client.list_forms().await?;
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod hr;
pub mod modules;
pub mod upload;

pub use auth::{AuthSession, AuthUser, Credentials, OtpTarget, Registration};
pub use client::{ApiClient, TENANT_HEADER};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{ApiError, Result};
pub use modules::ModuleInput;
pub use upload::UploadedFile;
