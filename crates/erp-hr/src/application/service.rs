//! HR application service

use chrono::NaiveDate;
use erp_common::{EntityId, ErpError};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{AttendanceEntry, AttendanceStatus, PayPeriod, PayrollCalculator, PayrollRun};
use crate::error::{HrError, Result};
use crate::ports::HrGateway;

pub struct HrService {
    gateway: Arc<dyn HrGateway>,
}

impl HrService {
    pub fn new(gateway: Arc<dyn HrGateway>) -> Self {
        Self { gateway }
    }

    /// Record one day of attendance for an active employee
    pub async fn mark_attendance(
        &self,
        employee_id: &EntityId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceEntry> {
        let employee = self.gateway.get_employee(employee_id).await.map_err(|e| match e {
            ErpError::NotFound(_) => HrError::EmployeeNotFound(employee_id.clone()),
            other => other.into(),
        })?;
        if !employee.is_active() {
            return Err(HrError::EmployeeInactive(employee_id.clone()));
        }

        let saved = self
            .gateway
            .mark_attendance(&AttendanceEntry::new(employee_id.clone(), date, status))
            .await?;
        info!(employee = %employee_id, %date, ?status, "attendance marked");
        Ok(saved)
    }

    /// Ask the backend to generate payslips for every active employee
    pub async fn auto_generate_payroll(&self, period: PayPeriod) -> Result<PayrollRun> {
        let run = self.gateway.auto_generate_payroll(period).await?;
        info!(%period, payslips = run.payslips.len(), total = %run.total_net(), "payroll generated");
        Ok(run)
    }

    /// Compute the payroll locally without persisting anything
    pub async fn preview_payroll(&self, period: PayPeriod) -> Result<PayrollRun> {
        let employees = self.gateway.list_employees().await?;
        let attendance = self.gateway.list_attendance(period).await?;

        let mut run = PayrollRun { period, payslips: Vec::new(), skipped: Vec::new() };
        for employee in employees.iter().filter(|e| e.is_active()) {
            match PayrollCalculator::compute(employee, &attendance, period) {
                Ok(slip) => run.payslips.push(slip),
                Err(e) => {
                    warn!(employee = %employee.id, error = %e, "skipping payslip");
                    run.skipped.push(employee.id.clone());
                }
            }
        }
        Ok(run)
    }
}
