//! Employee aggregate

use chrono::NaiveDate;
use erp_common::EntityId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
    Terminated,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EntityId,
    pub employee_code: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    /// Monthly basic salary
    pub basic_salary: Decimal,
    /// Monthly allowances, prorated with the basic salary
    #[serde(default)]
    pub allowances: Decimal,
    /// Monthly fixed deductions, not prorated
    #[serde(default)]
    pub deductions: Decimal,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default)]
    pub joining_date: Option<NaiveDate>,
}

impl Employee {
    pub fn new(employee_code: impl Into<String>, name: impl Into<String>, basic_salary: Decimal) -> Self {
        Self {
            id: EntityId::new(),
            employee_code: employee_code.into(),
            name: name.into(),
            email: None,
            department: None,
            designation: None,
            basic_salary,
            allowances: Decimal::ZERO,
            deductions: Decimal::ZERO,
            status: EmployeeStatus::Active,
            joining_date: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// Basic plus allowances for a full month
    pub fn monthly_gross(&self) -> Decimal {
        self.basic_salary + self.allowances
    }
}
