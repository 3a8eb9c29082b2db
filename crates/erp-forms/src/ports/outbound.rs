//! Outbound ports
//!
//! Infrastructure (the REST client, in-memory fakes) implements these.

use async_trait::async_trait;
use erp_common::{EntityId, ErpError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::aggregates::{Container, Form, FormField, FormRecord, Section, Subform};
use crate::domain::events::FormEvent;
use crate::domain::services::OrderUpdate;

/// Placement body for `PUT /api/fields/:id`
///
/// Both container ids are always sent; the one that does not apply is null
/// so the backend clears it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPlacement {
    pub order: u32,
    pub section_id: Option<EntityId>,
    pub subform_id: Option<EntityId>,
}

impl FieldPlacement {
    pub fn new(order: u32, container: &Container) -> Self {
        Self {
            order,
            section_id: container.section_id().cloned(),
            subform_id: container.subform_id().cloned(),
        }
    }
}

/// Placement body for `PUT /api/subforms/:id`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubformPlacement {
    pub order: u32,
    pub section_id: EntityId,
    pub parent_subform_id: Option<EntityId>,
    pub level: u32,
}

/// Body for `PUT /api/sections/:id`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPlacement {
    pub order: u32,
}

/// Lightweight listing entry for `GET /api/forms`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub module_id: Option<EntityId>,
    #[serde(default)]
    pub status: crate::domain::value_objects::FormStatus,
}

/// Form backend port
#[async_trait]
pub trait FormGateway: Send + Sync {
    /// Fetch a form with its full section/field/subform tree
    async fn get_form(&self, id: &EntityId) -> Result<Form, GatewayError>;

    async fn list_forms(&self) -> Result<Vec<FormSummary>, GatewayError>;

    /// Create a section; the server assigns the id
    async fn create_section(&self, form_id: &EntityId, section: &Section) -> Result<Section, GatewayError>;

    async fn update_section(&self, id: &EntityId, body: &SectionPlacement) -> Result<(), GatewayError>;

    async fn create_field(&self, field: &FormField) -> Result<FormField, GatewayError>;

    /// Replace a field's editable properties
    async fn update_field(&self, field: &FormField) -> Result<FormField, GatewayError>;

    async fn move_field(&self, id: &EntityId, body: &FieldPlacement) -> Result<(), GatewayError>;

    async fn delete_field(&self, id: &EntityId) -> Result<(), GatewayError>;

    async fn create_subform(&self, subform: &Subform) -> Result<Subform, GatewayError>;

    async fn move_subform(&self, id: &EntityId, body: &SubformPlacement) -> Result<(), GatewayError>;

    async fn delete_subform(&self, id: &EntityId) -> Result<(), GatewayError>;

    /// `POST /api/forms/:id/submit`
    async fn submit(&self, record: &FormRecord) -> Result<FormRecord, GatewayError>;

    /// `POST /api/forms/:id/events`
    async fn record_event(&self, event: &FormEvent) -> Result<(), GatewayError>;

    /// Persist one placement produced by a drag-end
    async fn apply_update(&self, update: &OrderUpdate) -> Result<(), GatewayError> {
        match update {
            OrderUpdate::Field { id, order, container } => {
                self.move_field(id, &FieldPlacement::new(*order, container)).await
            }
            OrderUpdate::Subform { id, order, section_id, parent_subform_id, level } => {
                let body = SubformPlacement {
                    order: *order,
                    section_id: section_id.clone(),
                    parent_subform_id: parent_subform_id.clone(),
                    level: *level,
                };
                self.move_subform(id, &body).await
            }
            OrderUpdate::Section { id, order } => {
                self.update_section(id, &SectionPlacement { order: *order }).await
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// User-facing notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
}

impl Toast {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Success, title: title.into(), message: message.into() }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Error, title: title.into(), message: message.into() }
    }
}

/// Notification surface port
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Gateway error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("rejected by server: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),
}

impl From<ErpError> for GatewayError {
    fn from(err: ErpError) -> Self {
        match err {
            ErpError::NotFound(m) => Self::NotFound(m),
            ErpError::Rejected(m) | ErpError::Validation(m) => Self::Rejected(m),
            ErpError::MissingData => Self::Decode(err.to_string()),
            ErpError::Transport(m) => Self::Transport(m),
        }
    }
}
