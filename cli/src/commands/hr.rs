//! HR commands

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use erp_common::EntityId;
use erp_hr::{HrService, PayrollRun};
use serde::Serialize;
use std::sync::Arc;
use tabled::Tabled;

use super::Context;
use crate::HrCommands;

#[derive(Serialize, Tabled)]
struct PayslipRow {
    employee: String,
    working_days: u32,
    payable_days: String,
    gross: String,
    deductions: String,
    net: String,
}

fn payslip_rows(run: &PayrollRun) -> Vec<PayslipRow> {
    run.payslips
        .iter()
        .map(|p| PayslipRow {
            employee: p.employee_id.to_string(),
            working_days: p.working_days,
            payable_days: p.payable_days.to_string(),
            gross: p.gross.to_string(),
            deductions: p.deductions.to_string(),
            net: p.net.to_string(),
        })
        .collect()
}

pub async fn handle(action: HrCommands, ctx: &Context) -> Result<()> {
    let service = HrService::new(Arc::new(ctx.client.clone()));
    match action {
        HrCommands::Payroll { period, preview } => {
            let run = if preview {
                service.preview_payroll(period).await?
            } else {
                service.auto_generate_payroll(period).await?
            };
            match ctx.format {
                crate::output::OutputFormat::Table => {
                    ctx.format.print(&payslip_rows(&run))?;
                    println!("Total net for {}: {}", run.period, run.total_net().to_string().bold());
                    if !run.skipped.is_empty() {
                        println!("{} {} employee(s) skipped", "!".yellow(), run.skipped.len());
                    }
                }
                format => format.print_value(&run)?,
            }
        }
        HrCommands::Attendance { employee, date, status } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let entry = service
                .mark_attendance(&EntityId::from(employee.as_str()), date, status.into())
                .await?;
            println!("{} {} marked {:?} on {}", "✓".green(), entry.employee_id, entry.status, entry.date);
        }
    }
    Ok(())
}
