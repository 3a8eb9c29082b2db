//! Form events
//!
//! Analytics events posted to `/api/forms/:id/events` while a form is filled.

use chrono::{DateTime, Utc};
use erp_common::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormEventKind {
    View,
    Start,
    Submit,
    Abandon,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormEvent {
    pub form_id: EntityId,
    pub event_type: FormEventKind,
    #[serde(default)]
    pub completion: Option<u8>,
    pub occurred_at: DateTime<Utc>,
}

impl FormEvent {
    pub fn new(form_id: EntityId, event_type: FormEventKind) -> Self {
        Self { form_id, event_type, completion: None, occurred_at: Utc::now() }
    }

    pub fn with_completion(mut self, completion: u8) -> Self {
        self.completion = Some(completion);
        self
    }
}
