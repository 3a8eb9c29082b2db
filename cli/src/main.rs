//! OpenERP CLI
//!
//! Command-line interface for the OpenERP platform.
//!
//! # Usage
//!
//! ```bash
//! erp forms tree 3f2c
//! erp forms submit 3f2c --data answers.json
//! erp permissions grant role:clerk form:3f2c edit delete
//! erp hr payroll 2024-04 --preview --format json
//! erp auth login --email ada@example.com
//! ```

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use erp_access::{PermissionKind, Resource, Subject};
use erp_hr::{AttendanceStatus, PayPeriod};
use erp_sdk::{ApiClient, ClientConfig, DEFAULT_BASE_URL};
use std::path::PathBuf;

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "erp")]
#[command(version)]
#[command(about = "OpenERP Command Line Interface", long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, env = "ERP_API_URL")]
    api_url: Option<String>,

    /// Bearer token
    #[arg(long, env = "ERP_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Tenant ID, sent as X-Tenant-Id
    #[arg(long, env = "ERP_TENANT_ID")]
    tenant_id: Option<String>,

    /// Output format
    #[arg(long, short, global = true)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short, global = true)]
    profile: Option<String>,

    /// Log requests to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect, validate and submit forms
    Forms {
        #[command(subcommand)]
        action: FormCommands,
    },
    /// Inspect and edit the permission matrix
    Permissions {
        #[command(subcommand)]
        action: PermissionCommands,
    },
    /// Attendance and payroll
    Hr {
        #[command(subcommand)]
        action: HrCommands,
    },
    /// Log in and store a token
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum FormCommands {
    /// List forms
    List,
    /// List a form's fields
    Show { id: String },
    /// Print sections and nested subforms with their paths
    Tree { id: String },
    /// Check a JSON data file against a form's rules
    Validate {
        id: String,
        /// JSON object of field id to value
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Validate and submit a JSON data file
    Submit {
        id: String,
        #[arg(short, long)]
        data: PathBuf,
    },
}

#[derive(Subcommand)]
enum PermissionCommands {
    /// Effective grants of a role or user on every module and form
    Effective {
        /// role:<id> or user:<id>
        subject: Subject,
    },
    /// Grant permissions
    Grant {
        /// role:<id> or user:<id>
        subject: Subject,
        /// module:<id> or form:<id>
        resource: Resource,
        #[arg(required = true)]
        permissions: Vec<PermissionKind>,
    },
    /// Revoke permissions
    Revoke {
        subject: Subject,
        resource: Resource,
        #[arg(required = true)]
        permissions: Vec<PermissionKind>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Present,
    Absent,
    HalfDay,
    Leave,
}

impl From<StatusArg> for AttendanceStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Present => AttendanceStatus::Present,
            StatusArg::Absent => AttendanceStatus::Absent,
            StatusArg::HalfDay => AttendanceStatus::HalfDay,
            StatusArg::Leave => AttendanceStatus::Leave,
        }
    }
}

#[derive(Subcommand)]
enum HrCommands {
    /// Generate payslips for a month (YYYY-MM)
    Payroll {
        period: PayPeriod,
        /// Compute locally from attendance without saving
        #[arg(long)]
        preview: bool,
    },
    /// Mark attendance for one employee
    Attendance {
        employee: String,
        #[arg(long, value_enum, default_value = "present")]
        status: StatusArg,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ERP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// One-time password login
    Otp {
        #[command(subcommand)]
        action: OtpCommands,
    },
}

#[derive(Subcommand)]
enum OtpCommands {
    /// Send a one-time password
    Send {
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Verify a one-time password and store the token
    Verify {
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        code: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

async fn run(cli: Cli) -> Result<()> {
    let profile = cli.profile;
    let command = match cli.command {
        Commands::Config { action } => return commands::config::handle(action, profile.as_deref()),
        other => other,
    };

    let config = config::Config::load(profile.as_deref())?;
    let client_config = ClientConfig {
        base_url: cli.api_url.or(config.api_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        token: cli.token.or(config.token),
        tenant_id: cli.tenant_id.or(config.tenant_id),
        ..ClientConfig::default()
    };
    tracing::debug!(
        base_url = %client_config.base_url,
        tenant = ?client_config.tenant_id,
        profile = ?profile,
        "client configured"
    );
    let ctx = commands::Context {
        client: ApiClient::new(client_config)?,
        format: cli.format.or(config.format).unwrap_or_default(),
        profile,
    };

    match command {
        Commands::Forms { action } => commands::forms::handle(action, &ctx).await,
        Commands::Permissions { action } => commands::permissions::handle(action, &ctx).await,
        Commands::Hr { action } => commands::hr::handle(action, &ctx).await,
        Commands::Auth { action } => commands::auth::handle(action, &ctx).await,
        Commands::Config { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    erp_common::telemetry::init(if cli.verbose { "debug" } else { "warn" });

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_permission_grant() {
        let cli = Cli::try_parse_from(["erp", "permissions", "grant", "role:r1", "form:f1", "edit", "view"]).unwrap();
        match cli.command {
            Commands::Permissions { action: PermissionCommands::Grant { subject, resource, permissions } } => {
                assert_eq!(subject.to_string(), "role:r1");
                assert_eq!(resource.to_string(), "form:f1");
                assert_eq!(permissions, vec![PermissionKind::Edit, PermissionKind::View]);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_rejects_bad_period_and_subject() {
        assert!(Cli::try_parse_from(["erp", "hr", "payroll", "2024-13"]).is_err());
        assert!(Cli::try_parse_from(["erp", "permissions", "effective", "team:t1"]).is_err());
    }

    #[test]
    fn test_parses_attendance_defaults() {
        let cli = Cli::try_parse_from(["erp", "hr", "attendance", "e1", "--status", "half-day"]).unwrap();
        match cli.command {
            Commands::Hr { action: HrCommands::Attendance { status, date, .. } } => {
                assert_eq!(AttendanceStatus::from(status), AttendanceStatus::HalfDay);
                assert_eq!(date, None);
            }
            _ => panic!("wrong command"),
        }
    }
}
