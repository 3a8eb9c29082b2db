//! Payroll computation
//!
//! Pay is prorated by payable days over the calendar days of the period.
//! Present and leave days pay in full, half days pay half, absent and
//! unmarked days pay nothing. Deductions are fixed per month.

use chrono::{Datelike, NaiveDate};
use erp_common::EntityId;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::attendance::AttendanceEntry;
use crate::domain::employee::Employee;
use crate::error::HrError;

/// A calendar month, written `YYYY-MM`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayPeriod {
    year: i32,
    month: u32,
}

impl PayPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, HrError> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(HrError::InvalidPeriod(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of calendar days in the month
    pub fn days(&self) -> u32 {
        let (y, m) = if self.month == 12 { (self.year + 1, 1) } else { (self.year, self.month + 1) };
        NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(30)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PayPeriod {
    type Err = HrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HrError::InvalidPeriod(s.to_string());
        let (y, m) = s.split_once('-').ok_or_else(invalid)?;
        let year = y.parse().map_err(|_| invalid())?;
        let month = m.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for PayPeriod {
    type Error = HrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PayPeriod> for String {
    fn from(value: PayPeriod) -> Self {
        value.to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayslipStatus {
    #[default]
    Draft,
    Processed,
    Paid,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payslip {
    pub employee_id: EntityId,
    pub period: PayPeriod,
    pub working_days: u32,
    pub payable_days: Decimal,
    pub gross: Decimal,
    pub deductions: Decimal,
    pub net: Decimal,
    #[serde(default)]
    pub status: PayslipStatus,
}

/// Response of `POST /api/payroll/auto-generate`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRun {
    pub period: PayPeriod,
    #[serde(default)]
    pub payslips: Vec<Payslip>,
    #[serde(default)]
    pub skipped: Vec<EntityId>,
}

impl PayrollRun {
    pub fn total_net(&self) -> Decimal {
        self.payslips.iter().map(|p| p.net).sum()
    }
}

fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub struct PayrollCalculator;

impl PayrollCalculator {
    /// Sum of payable fractions; the last entry for a date wins
    pub fn payable_days(employee_id: &EntityId, attendance: &[AttendanceEntry], period: PayPeriod) -> Decimal {
        let by_date: BTreeMap<NaiveDate, &AttendanceEntry> = attendance
            .iter()
            .filter(|a| &a.employee_id == employee_id && period.contains(a.date))
            .map(|a| (a.date, a))
            .collect();
        by_date.values().map(|a| a.status.payable_fraction()).sum()
    }

    /// Compute one employee's payslip for a month
    pub fn compute(
        employee: &Employee,
        attendance: &[AttendanceEntry],
        period: PayPeriod,
    ) -> Result<Payslip, HrError> {
        let invalid = || HrError::InvalidSalary(employee.employee_code.clone());
        if employee.basic_salary.is_sign_negative()
            || employee.allowances.is_sign_negative()
            || employee.deductions.is_sign_negative()
        {
            return Err(invalid());
        }

        let working_days = period.days();
        let payable_days = Self::payable_days(&employee.id, attendance, period);
        let gross = employee
            .basic_salary
            .checked_add(employee.allowances)
            .and_then(|monthly| monthly.checked_mul(payable_days))
            .and_then(|earned| earned.checked_div(Decimal::from(working_days)))
            .map(money)
            .ok_or_else(invalid)?;
        let deductions = money(employee.deductions.min(gross));
        let net = gross - deductions;

        Ok(Payslip {
            employee_id: employee.id.clone(),
            period,
            working_days,
            payable_days,
            gross,
            deductions,
            net,
            status: PayslipStatus::Draft,
        })
    }
}
