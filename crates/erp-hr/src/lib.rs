//! OpenERP HR
//!
//! Employees, daily attendance and monthly payroll.
//!
//! Payroll is prorated by payable days with `rust_decimal` arithmetic and
//! rounded to cents. Generation itself runs on the backend; the service can
//! also compute a local preview with the same rules.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use application::HrService;
pub use domain::{
    AttendanceEntry, AttendanceStatus, Employee, EmployeeStatus, PayPeriod, PayrollCalculator,
    PayrollRun, Payslip,
};
pub use error::{HrError, Result};
pub use ports::HrGateway;
