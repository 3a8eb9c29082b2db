//! CLI Commands

pub mod auth;
pub mod config;
pub mod forms;
pub mod hr;
pub mod permissions;

use erp_sdk::ApiClient;

use crate::output::OutputFormat;

/// What every remote command needs
pub struct Context {
    pub client: ApiClient,
    pub format: OutputFormat,
    pub profile: Option<String>,
}
