//! Form commands

use anyhow::{bail, Context as _, Result};
use colored::Colorize;
use erp_common::EntityId;
use erp_forms::domain::services::{completion_percentage, validate_form, FieldErrors, FormData};
use erp_forms::{
    build_subform_hierarchy_map, Form, FormField, FormGateway, FormRuntimeService, FormsError,
    Subform, SubformHierarchy,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tabled::Tabled;

use super::Context;
use crate::FormCommands;

#[derive(Serialize, Tabled)]
struct FormRow {
    id: String,
    name: String,
    status: String,
}

#[derive(Serialize, Tabled)]
struct FieldRow {
    id: String,
    location: String,
    label: String,
    #[tabled(rename = "type")]
    #[serde(rename = "type")]
    field_type: String,
    required: bool,
}

#[derive(Serialize, Tabled)]
struct ErrorRow {
    field: String,
    label: String,
    message: String,
}

fn lowercase_debug(value: impl std::fmt::Debug) -> String {
    format!("{:?}", value).to_lowercase()
}

fn field_row(field: &FormField, location: String) -> FieldRow {
    FieldRow {
        id: field.id.to_string(),
        location,
        label: field.label.clone(),
        field_type: lowercase_debug(field.field_type),
        required: field.required,
    }
}

/// Fields in display order; subform fields are located by hierarchy path
fn field_rows(form: &Form) -> Vec<FieldRow> {
    fn walk(subforms: &[Subform], title: &str, hierarchy: &SubformHierarchy, rows: &mut Vec<FieldRow>) {
        for subform in subforms {
            let path = hierarchy.path(&subform.id).unwrap_or("?");
            let location = format!("{} › {} {}", title, path, subform.name);
            rows.extend(subform.fields.iter().map(|f| field_row(f, location.clone())));
            walk(&subform.child_subforms, title, hierarchy, rows);
        }
    }

    let hierarchy = build_subform_hierarchy_map(form);
    let mut rows = Vec::new();
    for section in &form.sections {
        rows.extend(section.fields.iter().map(|f| field_row(f, section.title.clone())));
        walk(&section.subforms, &section.title, &hierarchy, &mut rows);
    }
    rows
}

fn render_tree(form: &Form) -> String {
    fn field_line(field: &FormField, depth: usize, out: &mut Vec<String>) {
        let marker = if field.required { " *".red().to_string() } else { String::new() };
        out.push(format!(
            "{}• {} {}{}",
            "  ".repeat(depth),
            field.label,
            format!("({})", lowercase_debug(field.field_type)).dimmed(),
            marker
        ));
    }

    fn subform_lines(subforms: &[Subform], depth: usize, hierarchy: &SubformHierarchy, out: &mut Vec<String>) {
        for subform in subforms {
            let path = hierarchy.path(&subform.id).unwrap_or("?");
            out.push(format!("{}▸ {} {}", "  ".repeat(depth), path.cyan(), subform.name.bold()));
            for field in &subform.fields {
                field_line(field, depth + 1, out);
            }
            subform_lines(&subform.child_subforms, depth + 1, hierarchy, out);
        }
    }

    let hierarchy = build_subform_hierarchy_map(form);
    let mut out = vec![format!("{} [{}]", form.name.bold(), lowercase_debug(form.status))];
    for section in &form.sections {
        out.push(format!("  {}", section.title.bold().underline()));
        for field in &section.fields {
            field_line(field, 2, &mut out);
        }
        subform_lines(&section.subforms, 2, &hierarchy, &mut out);
    }
    out.join("\n")
}

fn error_rows(form: &Form, errors: &FieldErrors) -> Vec<ErrorRow> {
    errors
        .iter()
        .map(|(id, message)| ErrorRow {
            field: id.to_string(),
            label: form.find_field(id).map(|f| f.label.clone()).unwrap_or_default(),
            message: message.clone(),
        })
        .collect()
}

fn read_data(path: &Path) -> Result<FormData> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} must be a JSON object of field id to value", path.display()))
}

async fn fetch(ctx: &Context, id: &str) -> Result<Form> {
    let mut form = ctx.client.get_form(&EntityId::from(id)).await?;
    form.sort_by_order();
    Ok(form)
}

pub async fn handle(action: FormCommands, ctx: &Context) -> Result<()> {
    match action {
        FormCommands::List => {
            let rows: Vec<FormRow> = ctx
                .client
                .list_forms()
                .await?
                .into_iter()
                .map(|f| FormRow { id: f.id.to_string(), name: f.name, status: lowercase_debug(f.status) })
                .collect();
            ctx.format.print(&rows)?;
        }
        FormCommands::Show { id } => {
            let form = fetch(ctx, &id).await?;
            ctx.format.print(&field_rows(&form))?;
        }
        FormCommands::Tree { id } => {
            let form = fetch(ctx, &id).await?;
            match ctx.format {
                crate::output::OutputFormat::Table => println!("{}", render_tree(&form)),
                format => format.print_value(&form)?,
            }
        }
        FormCommands::Validate { id, data } => {
            let form = fetch(ctx, &id).await?;
            let data = read_data(&data)?;
            let errors = validate_form(&form, &data);
            println!("Completion: {}%", completion_percentage(&form, &data));
            if !errors.is_empty() {
                ctx.format.print(&error_rows(&form, &errors))?;
                bail!("{} field(s) failed validation", errors.len());
            }
            println!("{} Data is valid", "✓".green());
        }
        FormCommands::Submit { id, data } => {
            let data = read_data(&data)?;
            let gateway: Arc<dyn FormGateway> = Arc::new(ctx.client.clone());
            let mut runtime = FormRuntimeService::open(gateway, &EntityId::from(id.as_str())).await?;
            for (field_id, value) in data {
                runtime.set_value(&field_id, value).await?;
            }
            match runtime.submit().await {
                Ok(record) => println!("{} Submitted record {}", "✓".green(), record.id),
                Err(FormsError::Validation(errors)) => {
                    ctx.format.print(&error_rows(runtime.form(), &errors))?;
                    bail!("{} field(s) failed validation", errors.len());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}
