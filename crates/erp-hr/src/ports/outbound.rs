//! Outbound ports

use async_trait::async_trait;
use erp_common::{EntityId, ErpResult};

use crate::domain::{AttendanceEntry, Employee, PayPeriod, PayrollRun};

/// HR backend port
#[async_trait]
pub trait HrGateway: Send + Sync {
    async fn list_employees(&self) -> ErpResult<Vec<Employee>>;

    async fn get_employee(&self, id: &EntityId) -> ErpResult<Employee>;

    /// Attendance entries dated inside `period`
    async fn list_attendance(&self, period: PayPeriod) -> ErpResult<Vec<AttendanceEntry>>;

    /// `POST /api/attendance`
    async fn mark_attendance(&self, entry: &AttendanceEntry) -> ErpResult<AttendanceEntry>;

    /// `POST /api/payroll/auto-generate`
    async fn auto_generate_payroll(&self, period: PayPeriod) -> ErpResult<PayrollRun>;
}
