//! Form builder service
//!
//! Owns the form being edited. Drag events mutate the local tree
//! synchronously; persistence follows on a background task after a short
//! delay. Ids the server assigns to palette-created fields are swapped into
//! the local tree on the next drag-end. Nothing else is reconciled: call
//! [`FormBuilderService::refetch`] to resynchronize with the server.

use erp_common::EntityId;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::dto::*;
use crate::domain::aggregates::{Container, Form, FormField, Section, Subform};
use crate::domain::services::{
    apply_drag_end, build_subform_hierarchy_map, resolve_drop_target, DragOutcome, DragSource,
    DropHints, DropTarget, OrderUpdate, SubformHierarchy,
};
use crate::error::{FormsError, Result};
use crate::ports::{FormGateway, Notifier, Toast};

struct Loaded {
    form: Form,
    hierarchy: SubformHierarchy,
}

impl Loaded {
    fn new(mut form: Form) -> Self {
        form.sort_by_order();
        let hierarchy = build_subform_hierarchy_map(&form);
        Self { form, hierarchy }
    }
}

/// Form builder application service
pub struct FormBuilderService {
    gateway: Arc<dyn FormGateway>,
    notifier: Arc<dyn Notifier>,
    config: BuilderConfig,
    loaded: Option<Loaded>,
    /// Local id of a palette-created field -> id assigned by the server
    created_ids: Arc<Mutex<HashMap<EntityId, EntityId>>>,
}

impl FormBuilderService {
    pub fn new(gateway: Arc<dyn FormGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(gateway, notifier, BuilderConfig::default())
    }

    pub fn with_config(
        gateway: Arc<dyn FormGateway>,
        notifier: Arc<dyn Notifier>,
        config: BuilderConfig,
    ) -> Self {
        Self { gateway, notifier, config, loaded: None, created_ids: Arc::default() }
    }

    pub fn form(&self) -> Option<&Form> {
        self.loaded.as_ref().map(|l| &l.form)
    }

    pub fn hierarchy(&self) -> Option<&SubformHierarchy> {
        self.loaded.as_ref().map(|l| &l.hierarchy)
    }

    fn current(&self) -> Result<&Loaded> {
        self.loaded.as_ref().ok_or(FormsError::NoFormLoaded)
    }

    fn form_id(&self) -> Result<EntityId> {
        Ok(self.current()?.form.id.clone())
    }

    /// Fetch a form and rebuild its hierarchy map
    pub async fn load(&mut self, form_id: &EntityId) -> Result<&Form> {
        let form = self.gateway.get_form(form_id).await?;
        info!(form = %form_id, sections = form.sections.len(), "form loaded");
        self.created_ids.lock().clear();
        Ok(&self.loaded.insert(Loaded::new(form)).form)
    }

    /// Reload the current form from the server
    pub async fn refetch(&mut self) -> Result<&Form> {
        let id = self.form_id()?;
        self.load(&id).await
    }

    /// Resolve where a drag would land; no mutation, no network
    pub fn handle_drag_over(&self, hints: &DropHints) -> Option<DropTarget> {
        let loaded = self.loaded.as_ref()?;
        resolve_drop_target(&loaded.form, &loaded.hierarchy, hints)
    }

    /// Apply a drop locally and schedule its persistence
    ///
    /// The tree and hierarchy are updated before this returns. The spawned
    /// task sleeps for `persist_delay`, posts a palette-created field, then
    /// issues every placement update concurrently. Failures are logged and
    /// toasted; local state is not rolled back.
    pub fn handle_drag_end(
        &mut self,
        source: &DragSource,
        hints: &DropHints,
        position: Option<usize>,
    ) -> Result<DragEndResult> {
        let (source, hints) = self.reconcile_created(source, hints)?;
        let (source, hints) = (&source, &hints);
        let loaded = self.loaded.as_mut().ok_or(FormsError::NoFormLoaded)?;
        let outcome = match apply_drag_end(&mut loaded.form, &loaded.hierarchy, source, hints, position) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(?source, error = %e, "drag-end rejected");
                self.notifier.notify(Toast::error("Drop failed", e.to_string()));
                return Err(e.into());
            }
        };

        if outcome.is_noop() {
            debug!(?source, "drag-end changed nothing");
            return Ok(DragEndResult { outcome, persist: None });
        }

        loaded.hierarchy = build_subform_hierarchy_map(&loaded.form);
        let persist = self.spawn_persist(&outcome);
        Ok(DragEndResult { outcome, persist: Some(persist) })
    }

    /// Swap server ids into the tree and into the drag event
    fn reconcile_created(&mut self, source: &DragSource, hints: &DropHints) -> Result<(DragSource, DropHints)> {
        let loaded = self.loaded.as_mut().ok_or(FormsError::NoFormLoaded)?;
        let ids = self.created_ids.lock().clone();
        for (local, server) in &ids {
            if loaded.form.rename_field(local, server.clone()) {
                debug!(%local, %server, "created field reconciled");
            }
        }

        let source = match source {
            DragSource::Field { id } => DragSource::Field { id: ids.get(id).unwrap_or(id).clone() },
            other => other.clone(),
        };
        let mut hints = hints.clone();
        if let Some(over) = hints.over_id.as_mut() {
            if let Some(server) = ids.get(&EntityId::from(over.as_str())) {
                *over = server.to_string();
            }
        }
        Ok((source, hints))
    }

    fn spawn_persist(&self, outcome: &DragOutcome) -> tokio::task::JoinHandle<PersistReport> {
        let gateway = Arc::clone(&self.gateway);
        let notifier = Arc::clone(&self.notifier);
        let created_ids = Arc::clone(&self.created_ids);
        let delay = self.config.persist_delay;
        let created = outcome.created.clone();
        let updates = outcome.updates.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut report = PersistReport::default();

            if let Some(field) = created {
                match gateway.create_field(&field).await {
                    Ok(saved) => {
                        report.succeeded += 1;
                        created_ids.lock().insert(field.id.clone(), saved.id.clone());
                        report.created = Some(saved);
                    }
                    Err(e) => {
                        warn!(field = %field.id, error = %e, "failed to create field");
                        notifier.notify(Toast::error("Error", format!("Failed to add {}", field.label)));
                        report.failed.push((field.id.clone(), e));
                    }
                }
            }

            let updates = with_server_ids(updates, &created_ids.lock());
            let results = join_all(updates.iter().map(|u| gateway.apply_update(u))).await;
            for (update, result) in updates.iter().zip(results) {
                match result {
                    Ok(()) => report.succeeded += 1,
                    Err(e) => {
                        warn!(entity = %update.id(), order = update.order(), error = %e, "failed to persist order");
                        report.failed.push((update.id().clone(), e));
                    }
                }
            }

            if !updates.is_empty() && report.failed.is_empty() {
                debug!(updates = updates.len(), "order persisted");
            } else if !report.failed.is_empty() {
                notifier.notify(Toast::error(
                    "Error",
                    format!("Failed to save order for {} item(s)", report.failed.len()),
                ));
            }
            report
        })
    }

    pub async fn add_section(&mut self, command: AddSectionCommand) -> Result<&Form> {
        let form_id = self.form_id()?;
        let mut section = Section::new(command.title);
        section.description = command.description;
        section.order = self.current()?.form.sections.len() as u32;
        self.gateway.create_section(&form_id, &section).await?;
        info!(form = %form_id, title = %section.title, "section added");
        self.refetch().await
    }

    pub async fn add_field(&mut self, command: AddFieldCommand) -> Result<&Form> {
        let form = &self.current()?.form;
        let siblings = form.fields_in(&command.container).ok_or_else(|| missing(&command.container))?;

        let label = command.label.unwrap_or_else(|| command.field_type.default_label().to_string());
        let mut field = FormField::new(label, command.field_type, command.container);
        field.order = siblings.len() as u32;
        field.required = command.required;
        field.placeholder = command.placeholder;
        field.validation = command.validation;
        if let Some(lookup) = command.lookup {
            field = field.with_lookup(lookup);
        }

        let saved = self.gateway.create_field(&field).await?;
        info!(field = %saved.id, label = %saved.label, "field added");
        self.refetch().await
    }

    pub async fn add_subform(&mut self, command: AddSubformCommand) -> Result<&Form> {
        let form = &self.current()?.form;
        let (container, level) = match &command.parent_subform_id {
            Some(parent) => {
                let parent_sub = form
                    .find_subform(parent)
                    .ok_or_else(|| FormsError::SubformNotFound(parent.clone()))?;
                (Container::subform(parent.clone()), parent_sub.level + 1)
            }
            None => (Container::section(command.section_id.clone()), 0),
        };
        let siblings = form.subforms_in(&container).ok_or_else(|| missing(&container))?;

        let mut subform = Subform::new(command.name, command.section_id);
        subform.parent_subform_id = command.parent_subform_id;
        subform.level = level;
        subform.order = siblings.len() as u32;

        let saved = self.gateway.create_subform(&subform).await?;
        info!(subform = %saved.id, level, "subform added");
        self.refetch().await
    }

    pub async fn update_field(&mut self, field: FormField) -> Result<&Form> {
        if self.current()?.form.find_field(&field.id).is_none() {
            return Err(FormsError::FieldNotFound(field.id));
        }
        self.gateway.update_field(&field).await?;
        self.refetch().await
    }

    pub async fn delete_field(&mut self, id: &EntityId) -> Result<&Form> {
        if self.current()?.form.find_field(id).is_none() {
            return Err(FormsError::FieldNotFound(id.clone()));
        }
        self.gateway.delete_field(id).await?;
        info!(field = %id, "field deleted");
        self.refetch().await
    }

    pub async fn delete_subform(&mut self, id: &EntityId) -> Result<&Form> {
        if self.current()?.form.find_subform(id).is_none() {
            return Err(FormsError::SubformNotFound(id.clone()));
        }
        self.gateway.delete_subform(id).await?;
        info!(subform = %id, "subform deleted");
        self.refetch().await
    }
}

/// Rewrite updates that still name a field by its local id
fn with_server_ids(updates: Vec<OrderUpdate>, ids: &HashMap<EntityId, EntityId>) -> Vec<OrderUpdate> {
    updates
        .into_iter()
        .map(|mut update| {
            if let Some(server) = ids.get(update.id()) {
                update.set_id(server.clone());
            }
            update
        })
        .collect()
}

fn missing(container: &Container) -> FormsError {
    match container {
        Container::Section { section_id } => FormsError::SectionNotFound(section_id.clone()),
        Container::Subform { subform_id } => FormsError::SubformNotFound(subform_id.clone()),
    }
}
