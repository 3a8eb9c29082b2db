//! Form runtime service
//!
//! Drives one fill-in session of a published form: tracks values,
//! recomputes completion, applies lookup auto-fill and submits.

use erp_common::EntityId;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::aggregates::{Form, FormRecord};
use crate::domain::events::{FormEvent, FormEventKind};
use crate::domain::services::{
    apply_lookup_autofill, build_submission, completion_percentage, validate_field, validate_form,
    FieldErrors, FormData,
};
use crate::domain::value_objects::LookupSelection;
use crate::error::{FormsError, Result};
use crate::ports::FormGateway;

/// Form runtime application service
pub struct FormRuntimeService {
    gateway: Arc<dyn FormGateway>,
    form: Form,
    data: FormData,
    started: bool,
    completion: u8,
}

impl FormRuntimeService {
    /// Load a form for filling and record a view event
    pub async fn open(gateway: Arc<dyn FormGateway>, form_id: &EntityId) -> Result<Self> {
        let mut form = gateway.get_form(form_id).await?;
        form.sort_by_order();
        let data = FormData::new();
        let completion = completion_percentage(&form, &data);
        let service = Self { gateway, form, data, started: false, completion };
        service.track(FormEvent::new(form_id.clone(), FormEventKind::View)).await;
        Ok(service)
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn completion(&self) -> u8 {
        self.completion
    }

    /// Event recording is best effort
    async fn track(&self, event: FormEvent) {
        let kind = event.event_type;
        if let Err(e) = self.gateway.record_event(&event).await {
            warn!(form = %self.form.id, ?kind, error = %e, "failed to record form event");
        }
    }

    async fn mark_started(&mut self) {
        if !self.started {
            self.started = true;
            self.track(FormEvent::new(self.form.id.clone(), FormEventKind::Start)).await;
        }
    }

    /// Set one value; returns the field's error message, if any
    pub async fn set_value(&mut self, field_id: &EntityId, value: Value) -> Result<Option<String>> {
        let field = self
            .form
            .find_field(field_id)
            .ok_or_else(|| FormsError::FieldNotFound(field_id.clone()))?;
        let error = validate_field(field, Some(&value));

        self.data.insert(field_id.clone(), value);
        self.completion = completion_percentage(&self.form, &self.data);
        debug!(field = %field_id, completion = self.completion, "value set");
        self.mark_started().await;
        Ok(error)
    }

    /// Apply a lookup selection; returns the ids filled from its payload
    pub async fn select_lookup(
        &mut self,
        field_id: &EntityId,
        selection: &LookupSelection,
    ) -> Result<Vec<EntityId>> {
        if self.form.find_field(field_id).is_none() {
            return Err(FormsError::FieldNotFound(field_id.clone()));
        }
        let filled = apply_lookup_autofill(&self.form, field_id, selection, &mut self.data);
        self.completion = completion_percentage(&self.form, &self.data);
        debug!(field = %field_id, filled = filled.len(), "lookup applied");
        self.mark_started().await;
        Ok(filled)
    }

    pub fn errors(&self) -> FieldErrors {
        validate_form(&self.form, &self.data)
    }

    /// Validate, submit and record a submit event
    pub async fn submit(&mut self) -> Result<FormRecord> {
        let record = build_submission(&self.form, &self.data)?;
        let saved = self.gateway.submit(&record).await?;
        info!(form = %self.form.id, record = %saved.id, "form submitted");
        self.track(
            FormEvent::new(self.form.id.clone(), FormEventKind::Submit).with_completion(self.completion),
        )
        .await;
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::form::fixtures::sample_form;
    use crate::domain::value_objects::FormStatus;
    use crate::infrastructure::InMemoryFormGateway;
    use serde_json::json;

    fn published() -> Form {
        let mut form = sample_form();
        form.status = FormStatus::Published;
        form.sections[0].fields[0].required = true;
        form
    }

    #[tokio::test]
    async fn test_session_tracks_events_and_completion() {
        let gateway = Arc::new(InMemoryFormGateway::with_forms(vec![published()]));
        let mut session = FormRuntimeService::open(gateway.clone(), &EntityId::from("form-1"))
            .await
            .unwrap();
        assert_eq!(session.completion(), 0);

        let err = session.set_value(&EntityId::from("a"), json!("")).await.unwrap();
        assert!(err.is_some());
        session.set_value(&EntityId::from("a"), json!("hello")).await.unwrap();
        assert_eq!(session.completion(), 100);

        let record = session.submit().await.unwrap();
        assert_eq!(record.form_id, EntityId::from("form-1"));
        assert_eq!(gateway.records().len(), 1);

        let kinds: Vec<FormEventKind> = gateway.events().iter().map(|e| e.event_type).collect();
        assert_eq!(kinds, vec![FormEventKind::View, FormEventKind::Start, FormEventKind::Submit]);
        assert_eq!(gateway.events()[2].completion, Some(100));
    }

    #[tokio::test]
    async fn test_submit_rejects_draft_form() {
        let mut form = published();
        form.status = FormStatus::Draft;
        let gateway = Arc::new(InMemoryFormGateway::with_forms(vec![form]));
        let mut session = FormRuntimeService::open(gateway.clone(), &EntityId::from("form-1"))
            .await
            .unwrap();
        session.set_value(&EntityId::from("a"), json!("x")).await.unwrap();
        assert!(matches!(session.submit().await, Err(FormsError::NotPublished(_))));
        assert!(gateway.records().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_field_is_rejected() {
        let gateway = Arc::new(InMemoryFormGateway::with_forms(vec![published()]));
        let mut session = FormRuntimeService::open(gateway, &EntityId::from("form-1")).await.unwrap();
        let err = session.set_value(&EntityId::from("nope"), json!(1)).await.unwrap_err();
        assert!(matches!(err, FormsError::FieldNotFound(_)));
    }
}
