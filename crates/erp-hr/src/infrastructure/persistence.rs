//! In-memory HR backend for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use erp_common::{EntityId, ErpError, ErpResult};

use crate::domain::{AttendanceEntry, Employee, PayPeriod, PayrollCalculator, PayrollRun};
use crate::ports::HrGateway;

#[derive(Default)]
pub struct InMemoryHrGateway {
    employees: DashMap<EntityId, Employee>,
    attendance: DashMap<(EntityId, NaiveDate), AttendanceEntry>,
    runs: DashMap<PayPeriod, PayrollRun>,
}

impl InMemoryHrGateway {
    pub fn with_employees(employees: Vec<Employee>) -> Self {
        let gateway = Self::default();
        for e in employees {
            gateway.employees.insert(e.id.clone(), e);
        }
        gateway
    }

    pub fn run(&self, period: PayPeriod) -> Option<PayrollRun> {
        self.runs.get(&period).map(|r| r.clone())
    }

    fn attendance_in(&self, period: PayPeriod) -> Vec<AttendanceEntry> {
        let mut entries: Vec<AttendanceEntry> = self
            .attendance
            .iter()
            .filter(|e| period.contains(e.date))
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date));
        entries
    }
}

#[async_trait]
impl HrGateway for InMemoryHrGateway {
    async fn list_employees(&self) -> ErpResult<Vec<Employee>> {
        let mut all: Vec<Employee> = self.employees.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.employee_code.cmp(&b.employee_code));
        Ok(all)
    }

    async fn get_employee(&self, id: &EntityId) -> ErpResult<Employee> {
        self.employees
            .get(id)
            .map(|e| e.clone())
            .ok_or_else(|| ErpError::NotFound(format!("employee {}", id)))
    }

    async fn list_attendance(&self, period: PayPeriod) -> ErpResult<Vec<AttendanceEntry>> {
        Ok(self.attendance_in(period))
    }

    async fn mark_attendance(&self, entry: &AttendanceEntry) -> ErpResult<AttendanceEntry> {
        if !self.employees.contains_key(&entry.employee_id) {
            return Err(ErpError::NotFound(format!("employee {}", entry.employee_id)));
        }
        self.attendance
            .insert((entry.employee_id.clone(), entry.date), entry.clone());
        Ok(entry.clone())
    }

    async fn auto_generate_payroll(&self, period: PayPeriod) -> ErpResult<PayrollRun> {
        let attendance = self.attendance_in(period);
        let mut employees: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| e.is_active())
            .map(|e| e.value().clone())
            .collect();
        employees.sort_by(|a, b| a.employee_code.cmp(&b.employee_code));

        let mut run = PayrollRun { period, payslips: Vec::new(), skipped: Vec::new() };
        for employee in &employees {
            match PayrollCalculator::compute(employee, &attendance, period) {
                Ok(slip) => run.payslips.push(slip),
                Err(_) => run.skipped.push(employee.id.clone()),
            }
        }
        self.runs.insert(period, run.clone());
        Ok(run)
    }
}
