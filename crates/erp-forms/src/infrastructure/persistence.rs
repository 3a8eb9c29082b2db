//! In-memory gateway implementation for testing

use async_trait::async_trait;
use erp_common::EntityId;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use crate::domain::aggregates::{Container, Form, FormField, FormRecord, Section, Subform};
use crate::domain::events::FormEvent;
use crate::ports::outbound::{
    FieldPlacement, FormGateway, FormSummary, GatewayError, SectionPlacement, SubformPlacement,
};

/// Mutating call received by [`InMemoryFormGateway`]
#[derive(Clone, Debug, PartialEq)]
pub enum GatewayCall {
    CreateSection(EntityId),
    UpdateSection(EntityId, SectionPlacement),
    CreateField(FormField),
    UpdateField(EntityId),
    MoveField(EntityId, FieldPlacement),
    DeleteField(EntityId),
    CreateSubform(EntityId),
    MoveSubform(EntityId, SubformPlacement),
    DeleteSubform(EntityId),
}

/// In-memory form backend (for testing)
///
/// Applies writes to its own copy of each form so a refetch observes them.
#[derive(Default)]
pub struct InMemoryFormGateway {
    forms: Mutex<HashMap<EntityId, Form>>,
    records: Mutex<Vec<FormRecord>>,
    events: Mutex<Vec<FormEvent>>,
    calls: Mutex<Vec<GatewayCall>>,
    failing: Mutex<HashSet<EntityId>>,
}

impl InMemoryFormGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_forms(forms: impl IntoIterator<Item = Form>) -> Self {
        let gateway = Self::default();
        gateway
            .forms
            .lock()
            .extend(forms.into_iter().map(|f| (f.id.clone(), f)));
        gateway
    }

    /// Make every write touching `id` fail with a transport error
    pub fn fail_on(&self, id: &str) {
        self.failing.lock().insert(EntityId::from(id));
    }

    /// Server-side copy of a form
    pub fn form(&self, id: &EntityId) -> Option<Form> {
        self.forms.lock().get(id).cloned().map(|mut f| {
            f.sort_by_order();
            f
        })
    }

    /// Mutating calls in arrival order
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    pub fn records(&self) -> Vec<FormRecord> {
        self.records.lock().clone()
    }

    pub fn events(&self) -> Vec<FormEvent> {
        self.events.lock().clone()
    }

    fn record(&self, call: GatewayCall, id: &EntityId) -> Result<(), GatewayError> {
        self.calls.lock().push(call);
        if self.failing.lock().contains(id) {
            return Err(GatewayError::Transport(format!("injected failure for {}", id)));
        }
        Ok(())
    }

    /// Run `f` against the form that owns `container`
    fn with_container<T>(
        &self,
        container: &Container,
        f: impl FnOnce(&mut Form) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let mut forms = self.forms.lock();
        let form = forms
            .values_mut()
            .find(|form| form.fields_in(container).is_some())
            .ok_or_else(|| GatewayError::NotFound(format!("{:?}", container)))?;
        f(form)
    }

    fn with_field<T>(
        &self,
        id: &EntityId,
        f: impl FnOnce(&mut Form) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let mut forms = self.forms.lock();
        let form = forms
            .values_mut()
            .find(|form| form.find_field(id).is_some())
            .ok_or_else(|| GatewayError::NotFound(format!("field {}", id)))?;
        f(form)
    }

    fn with_subform<T>(
        &self,
        id: &EntityId,
        f: impl FnOnce(&mut Form) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let mut forms = self.forms.lock();
        let form = forms
            .values_mut()
            .find(|form| form.find_subform(id).is_some())
            .ok_or_else(|| GatewayError::NotFound(format!("subform {}", id)))?;
        f(form)
    }
}

fn not_found(what: &str, id: &EntityId) -> GatewayError {
    GatewayError::NotFound(format!("{} {}", what, id))
}

#[async_trait]
impl FormGateway for InMemoryFormGateway {
    async fn get_form(&self, id: &EntityId) -> Result<Form, GatewayError> {
        self.form(id).ok_or_else(|| not_found("form", id))
    }

    async fn list_forms(&self) -> Result<Vec<FormSummary>, GatewayError> {
        let mut forms: Vec<FormSummary> = self
            .forms
            .lock()
            .values()
            .map(|f| FormSummary {
                id: f.id.clone(),
                name: f.name.clone(),
                module_id: f.module_id.clone(),
                status: f.status,
            })
            .collect();
        forms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(forms)
    }

    async fn create_section(&self, form_id: &EntityId, section: &Section) -> Result<Section, GatewayError> {
        let mut saved = section.clone();
        saved.id = EntityId::new();
        self.record(GatewayCall::CreateSection(saved.id.clone()), form_id)?;
        let mut forms = self.forms.lock();
        let form = forms.get_mut(form_id).ok_or_else(|| not_found("form", form_id))?;
        form.sections.push(saved.clone());
        Ok(saved)
    }

    async fn update_section(&self, id: &EntityId, body: &SectionPlacement) -> Result<(), GatewayError> {
        self.record(GatewayCall::UpdateSection(id.clone(), body.clone()), id)?;
        let mut forms = self.forms.lock();
        let section = forms
            .values_mut()
            .find_map(|f| f.section_mut(id))
            .ok_or_else(|| not_found("section", id))?;
        section.order = body.order;
        Ok(())
    }

    async fn create_field(&self, field: &FormField) -> Result<FormField, GatewayError> {
        self.record(GatewayCall::CreateField(field.clone()), &field.id)?;
        let mut saved = field.clone();
        saved.id = EntityId::new();
        self.with_container(&field.container, |form| {
            form.insert_field(&field.container, Some(field.order as usize), saved.clone());
            Ok(())
        })?;
        Ok(saved)
    }

    async fn update_field(&self, field: &FormField) -> Result<FormField, GatewayError> {
        self.record(GatewayCall::UpdateField(field.id.clone()), &field.id)?;
        self.with_field(&field.id, |form| {
            let existing = form.find_field(&field.id).ok_or_else(|| not_found("field", &field.id))?;
            let container = existing.container.clone();
            let order = existing.order;
            let fields = form.fields_in_mut(&container).ok_or_else(|| not_found("field", &field.id))?;
            let slot = fields
                .iter_mut()
                .find(|f| f.id == field.id)
                .ok_or_else(|| not_found("field", &field.id))?;
            *slot = FormField { container, order, ..field.clone() };
            Ok(slot.clone())
        })
    }

    async fn move_field(&self, id: &EntityId, body: &FieldPlacement) -> Result<(), GatewayError> {
        self.record(GatewayCall::MoveField(id.clone(), body.clone()), id)?;
        let dest = match (&body.subform_id, &body.section_id) {
            (Some(subform_id), _) => Container::subform(subform_id.clone()),
            (None, Some(section_id)) => Container::section(section_id.clone()),
            (None, None) => return Err(GatewayError::Rejected("field needs a container".into())),
        };
        self.with_field(id, |form| {
            if form.fields_in(&dest).is_none() {
                return Err(GatewayError::NotFound(format!("{:?}", dest)));
            }
            let (_, _, field) = form.take_field(id).ok_or_else(|| not_found("field", id))?;
            form.insert_field(&dest, Some(body.order as usize), field);
            Ok(())
        })
    }

    async fn delete_field(&self, id: &EntityId) -> Result<(), GatewayError> {
        self.record(GatewayCall::DeleteField(id.clone()), id)?;
        self.with_field(id, |form| {
            form.take_field(id).map(|_| ()).ok_or_else(|| not_found("field", id))
        })
    }

    async fn create_subform(&self, subform: &Subform) -> Result<Subform, GatewayError> {
        let mut saved = subform.clone();
        saved.id = EntityId::new();
        self.record(GatewayCall::CreateSubform(saved.id.clone()), &subform.section_id)?;
        let container = subform.container();
        self.with_container(&container, |form| {
            form.insert_subform(&container, Some(subform.order as usize), saved.clone());
            Ok(())
        })?;
        Ok(saved)
    }

    async fn move_subform(&self, id: &EntityId, body: &SubformPlacement) -> Result<(), GatewayError> {
        self.record(GatewayCall::MoveSubform(id.clone(), body.clone()), id)?;
        let dest = match &body.parent_subform_id {
            Some(parent) => Container::subform(parent.clone()),
            None => Container::section(body.section_id.clone()),
        };
        self.with_subform(id, |form| {
            if form.subforms_in(&dest).is_none() {
                return Err(GatewayError::NotFound(format!("{:?}", dest)));
            }
            if let Some(parent) = dest.subform_id() {
                if form.is_self_or_descendant(id, parent) {
                    return Err(GatewayError::Rejected(format!("subform {} cannot contain itself", id)));
                }
            }
            let (_, _, sub) = form.take_subform(id).ok_or_else(|| not_found("subform", id))?;
            form.insert_subform(&dest, Some(body.order as usize), sub);
            Ok(())
        })
    }

    async fn delete_subform(&self, id: &EntityId) -> Result<(), GatewayError> {
        self.record(GatewayCall::DeleteSubform(id.clone()), id)?;
        self.with_subform(id, |form| {
            form.take_subform(id).map(|_| ()).ok_or_else(|| not_found("subform", id))
        })
    }

    async fn submit(&self, record: &FormRecord) -> Result<FormRecord, GatewayError> {
        if !self.forms.lock().contains_key(&record.form_id) {
            return Err(not_found("form", &record.form_id));
        }
        self.records.lock().push(record.clone());
        Ok(record.clone())
    }

    async fn record_event(&self, event: &FormEvent) -> Result<(), GatewayError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::form::fixtures::sample_form;

    #[tokio::test]
    async fn test_move_field_across_containers() {
        let gateway = InMemoryFormGateway::with_forms(vec![sample_form()]);
        gateway
            .move_field(&EntityId::from("a"), &FieldPlacement::new(0, &Container::subform("sf1")))
            .await
            .unwrap();

        let form = gateway.form(&EntityId::from("form-1")).unwrap();
        let sub = form.find_subform(&EntityId::from("sf1")).unwrap();
        assert_eq!(sub.fields[0].id, EntityId::from("a"));
        assert_eq!(sub.fields[0].container, Container::subform("sf1"));
        assert_eq!(form.sections[0].fields.len(), 1);
    }

    #[tokio::test]
    async fn test_move_field_to_front_of_occupied_container() {
        let gateway = InMemoryFormGateway::with_forms(vec![sample_form()]);
        let s1 = Container::section("s1");
        gateway.move_field(&EntityId::from("x"), &FieldPlacement::new(0, &s1)).await.unwrap();

        let form = gateway.form(&EntityId::from("form-1")).unwrap();
        let order: Vec<_> = form.sections[0].fields.iter().map(|f| (f.id.as_str(), f.order)).collect();
        assert_eq!(order, vec![("x", 0), ("a", 1), ("b", 2)]);
    }

    #[tokio::test]
    async fn test_sequential_placements_rebuild_permutation() {
        let gateway = InMemoryFormGateway::with_forms(vec![sample_form()]);
        let s1 = Container::section("s1");
        for (id, order) in [("b", 0), ("a", 1)] {
            gateway.move_field(&EntityId::from(id), &FieldPlacement::new(order, &s1)).await.unwrap();
        }
        let form = gateway.form(&EntityId::from("form-1")).unwrap();
        let ids: Vec<_> = form.sections[0].fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_move_subform_to_front_of_section() {
        let gateway = InMemoryFormGateway::with_forms(vec![sample_form()]);
        let body = SubformPlacement {
            order: 0,
            section_id: EntityId::from("s1"),
            parent_subform_id: None,
            level: 0,
        };
        gateway.move_subform(&EntityId::from("sf1b"), &body).await.unwrap();

        let form = gateway.form(&EntityId::from("form-1")).unwrap();
        let roots: Vec<_> = form.sections[0].subforms.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(roots, vec!["sf1b", "sf1", "sf2"]);
        assert_eq!(form.find_subform(&EntityId::from("sf1b")).unwrap().level, 0);
    }

    #[tokio::test]
    async fn test_failure_injection_is_per_entity() {
        let gateway = InMemoryFormGateway::with_forms(vec![sample_form()]);
        gateway.fail_on("b");
        let placement = FieldPlacement::new(0, &Container::section("s1"));

        let err = gateway.move_field(&EntityId::from("b"), &placement).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
        assert!(gateway.move_field(&EntityId::from("a"), &placement).await.is_ok());
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_form_is_not_found() {
        let gateway = InMemoryFormGateway::new();
        let err = gateway.get_form(&EntityId::from("missing")).await.unwrap_err();
        assert_eq!(err, GatewayError::NotFound("form missing".into()));
    }
}
