//! Permission commands

use anyhow::{bail, Result};
use colored::Colorize;
use erp_access::{PartitionOutcome, PermissionKind, PermissionMatrix, PermissionService, Resource, Subject};
use serde::Serialize;
use std::sync::Arc;
use tabled::Tabled;

use super::Context;
use crate::output::check;
use crate::PermissionCommands;

#[derive(Serialize, Tabled)]
struct GrantRow {
    resource: String,
    name: String,
    #[tabled(display_with = "display_flag")]
    view: bool,
    #[tabled(display_with = "display_flag")]
    create: bool,
    #[tabled(display_with = "display_flag")]
    edit: bool,
    #[tabled(display_with = "display_flag")]
    delete: bool,
    #[tabled(display_with = "display_flag")]
    export: bool,
}

fn display_flag(granted: &bool) -> String {
    check(*granted)
}

fn resource_name(matrix: &PermissionMatrix, resource: &Resource) -> String {
    let name = match resource {
        Resource::Module(id) => matrix.modules.iter().find(|m| &m.id == id).map(|m| m.name.clone()),
        Resource::Form(id) => matrix
            .modules
            .iter()
            .flat_map(|m| m.forms.iter())
            .find(|f| &f.id == id)
            .map(|f| format!("  {}", f.name)),
    };
    name.unwrap_or_default()
}

fn grant_rows(matrix: &PermissionMatrix, subject: &Subject) -> Vec<GrantRow> {
    matrix
        .resources()
        .into_iter()
        .map(|resource| {
            let grants = matrix.effective_grants(subject, &resource);
            GrantRow {
                name: resource_name(matrix, &resource),
                resource: resource.to_string(),
                view: grants.can_view,
                create: grants.can_create,
                edit: grants.can_edit,
                delete: grants.can_delete,
                export: grants.can_export,
            }
        })
        .collect()
}

async fn load(service: &PermissionService) -> Result<PermissionMatrix> {
    let report = service.load().await;
    if let Some((what, e)) = report.failures.first() {
        bail!("could not load {}: {}", what, e);
    }
    Ok(report.matrix)
}

fn describe(label: &str, outcome: &PartitionOutcome) -> String {
    match outcome {
        PartitionOutcome::Skipped => format!("{}: nothing to save", label),
        PartitionOutcome::Saved(rows) => format!("{}: {} row(s) saved", label, rows),
        PartitionOutcome::Failed(e) => format!("{}: {}", label, e.to_string().red()),
    }
}

async fn change(
    ctx: &Context,
    subject: Subject,
    resource: Resource,
    permissions: Vec<PermissionKind>,
    granted: bool,
) -> Result<()> {
    let service = PermissionService::new(Arc::new(ctx.client.clone()));
    let mut matrix = load(&service).await?;
    for kind in &permissions {
        matrix.set(&subject, &resource, *kind, granted)?;
    }
    if !matrix.has_pending() {
        println!("No change: {} already matches on {}", subject, resource);
        return Ok(());
    }

    let outcome = service.save(&mut matrix).await;
    println!("{}", describe("roles", &outcome.roles));
    println!("{}", describe("users", &outcome.users));
    if !outcome.is_complete() {
        bail!("permissions were only partially saved");
    }
    Ok(())
}

pub async fn handle(action: PermissionCommands, ctx: &Context) -> Result<()> {
    match action {
        PermissionCommands::Effective { subject } => {
            let service = PermissionService::new(Arc::new(ctx.client.clone()));
            let matrix = load(&service).await?;
            ctx.format.print(&grant_rows(&matrix, &subject))?;
        }
        PermissionCommands::Grant { subject, resource, permissions } => {
            change(ctx, subject, resource, permissions, true).await?;
        }
        PermissionCommands::Revoke { subject, resource, permissions } => {
            change(ctx, subject, resource, permissions, false).await?;
        }
    }
    Ok(())
}
