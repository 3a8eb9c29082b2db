//! Machine master

use chrono::{DateTime, NaiveDate, Utc};
use erp_common::EntityId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::master::{normalize_code, normalize_name, optional_text, Master};
use crate::error::{MasterError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    #[default]
    Active,
    UnderMaintenance,
    Inactive,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: EntityId,
    pub machine_code: String,
    pub name: String,
    #[serde(default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Rated output per hour
    #[serde(default)]
    pub capacity: Option<Decimal>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: MachineStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default)]
pub struct MachineDraft {
    pub machine_code: String,
    pub name: String,
    pub machine_type: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
}

impl MachineDraft {
    pub fn new(machine_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self { machine_code: machine_code.into(), name: name.into(), ..Self::default() }
    }
}

/// `None` leaves a field unchanged
#[derive(Clone, Debug, Default)]
pub struct MachinePatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<Decimal>,
    pub status: Option<MachineStatus>,
}

fn validate_capacity(capacity: Option<Decimal>) -> Result<Option<Decimal>> {
    match capacity {
        Some(c) if c <= Decimal::ZERO => Err(MasterError::invalid("capacity", "must be positive")),
        other => Ok(other),
    }
}

impl Master for Machine {
    type Draft = MachineDraft;
    type Patch = MachinePatch;
    type Status = MachineStatus;

    const KIND: &'static str = "machine";

    fn create(draft: MachineDraft) -> Result<Self> {
        let today = Utc::now();
        if let Some(date) = draft.purchase_date {
            if date > today.date_naive() {
                return Err(MasterError::invalid("purchaseDate", "must not be in the future"));
            }
        }
        Ok(Self {
            id: EntityId::new(),
            machine_code: normalize_code("machineCode", &draft.machine_code)?,
            name: normalize_name("name", &draft.name)?,
            machine_type: optional_text(draft.machine_type),
            manufacturer: optional_text(draft.manufacturer),
            model: optional_text(draft.model),
            serial_number: optional_text(draft.serial_number),
            location: optional_text(draft.location),
            capacity: validate_capacity(draft.capacity)?,
            purchase_date: draft.purchase_date,
            status: MachineStatus::Active,
            created_at: today,
            updated_at: today,
        })
    }

    fn apply(&mut self, patch: MachinePatch) -> Result<()> {
        let name = patch.name.as_deref().map(|n| normalize_name("name", n)).transpose()?;
        let capacity = validate_capacity(patch.capacity)?;

        if let Some(name) = name {
            self.name = name;
        }
        if patch.location.is_some() {
            self.location = optional_text(patch.location);
        }
        if capacity.is_some() {
            self.capacity = capacity;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn code(&self) -> &str {
        &self.machine_code
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> MachineStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_normalizes() {
        let mut draft = MachineDraft::new("cnc-01", " Lathe ");
        draft.location = Some("  ".into());
        let m = Machine::create(draft).unwrap();
        assert_eq!(m.machine_code, "CNC-01");
        assert_eq!(m.name, "Lathe");
        assert_eq!(m.location, None);
        assert_eq!(m.status, MachineStatus::Active);
    }

    #[test]
    fn test_create_rejects_bad_capacity() {
        let mut draft = MachineDraft::new("CNC-01", "Lathe");
        draft.capacity = Some(dec!(0));
        assert!(matches!(
            Machine::create(draft),
            Err(MasterError::Invalid { field: "capacity", .. })
        ));
    }

    #[test]
    fn test_patch_is_all_or_nothing() {
        let mut m = Machine::create(MachineDraft::new("CNC-01", "Lathe")).unwrap();
        let patch = MachinePatch {
            name: Some("Mill".into()),
            capacity: Some(dec!(-5)),
            ..MachinePatch::default()
        };
        assert!(m.apply(patch).is_err());
        assert_eq!(m.name, "Lathe");

        m.apply(MachinePatch { status: Some(MachineStatus::UnderMaintenance), ..MachinePatch::default() })
            .unwrap();
        assert_eq!(m.status(), MachineStatus::UnderMaintenance);
    }
}
