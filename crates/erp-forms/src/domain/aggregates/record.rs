//! Form Record Aggregate

use chrono::{DateTime, Utc};
use erp_common::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::value_objects::RecordValue;

/// Flat record submitted against a form, keyed by field id
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    pub id: EntityId,
    pub form_id: EntityId,
    pub record_data: BTreeMap<String, RecordValue>,
    #[serde(default)]
    pub status: RecordStatus,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Draft,
    #[default]
    Submitted,
    Approved,
    Rejected,
}

impl FormRecord {
    pub fn create(form_id: EntityId, record_data: BTreeMap<String, RecordValue>) -> Self {
        Self {
            id: EntityId::new(),
            form_id,
            record_data,
            status: RecordStatus::Submitted,
            submitted_at: Utc::now(),
        }
    }

    /// Plain `{field_id: value}` view of the record
    pub fn values(&self) -> BTreeMap<&str, &serde_json::Value> {
        self.record_data
            .iter()
            .map(|(k, v)| (k.as_str(), &v.value))
            .collect()
    }
}
