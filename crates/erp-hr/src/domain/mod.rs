//! Domain module

pub mod attendance;
pub mod employee;
pub mod payroll;

pub use attendance::{AttendanceEntry, AttendanceStatus};
pub use employee::{Employee, EmployeeStatus};
pub use payroll::{PayPeriod, PayrollCalculator, PayrollRun, Payslip, PayslipStatus};
