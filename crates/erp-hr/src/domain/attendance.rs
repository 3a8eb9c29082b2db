//! Attendance entries

use chrono::{NaiveDate, NaiveTime};
use erp_common::EntityId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Leave,
}

impl AttendanceStatus {
    /// Fraction of a day that is paid
    pub fn payable_fraction(&self) -> Decimal {
        match self {
            Self::Present | Self::Leave => dec!(1),
            Self::HalfDay => dec!(0.5),
            Self::Absent => Decimal::ZERO,
        }
    }
}

/// Body of `POST /api/attendance`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub employee_id: EntityId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<NaiveTime>,
}

impl AttendanceEntry {
    pub fn new(employee_id: EntityId, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self { employee_id, date, status, check_in: None, check_out: None }
    }
}
