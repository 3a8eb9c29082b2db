//! Data Transfer Objects (DTOs)

use erp_common::EntityId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::domain::aggregates::{Container, FormField};
use crate::domain::services::DragOutcome;
use crate::domain::value_objects::{FieldType, FieldValidation, LookupConfig};
use crate::ports::GatewayError;

// =============================================================================
// Builder Commands
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddSectionCommand {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddFieldCommand {
    pub container: Container,
    pub field_type: FieldType,
    pub label: Option<String>,
    pub required: bool,
    pub placeholder: Option<String>,
    pub validation: Option<FieldValidation>,
    pub lookup: Option<LookupConfig>,
}

impl AddFieldCommand {
    pub fn new(container: Container, field_type: FieldType) -> Self {
        Self {
            container,
            field_type,
            label: None,
            required: false,
            placeholder: None,
            validation: None,
            lookup: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddSubformCommand {
    pub name: String,
    pub section_id: EntityId,
    pub parent_subform_id: Option<EntityId>,
}

// =============================================================================
// Builder Configuration
// =============================================================================

#[derive(Clone, Debug)]
pub struct BuilderConfig {
    /// Wait between the local drag-end mutation and the persistence calls
    pub persist_delay: Duration,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self { persist_delay: Duration::from_millis(500) }
    }
}

// =============================================================================
// Drag-End Results
// =============================================================================

/// What the background persistence task achieved
#[derive(Debug, Default)]
pub struct PersistReport {
    /// Server copy of a field created from the palette
    pub created: Option<FormField>,
    pub succeeded: usize,
    pub failed: Vec<(EntityId, GatewayError)>,
}

impl PersistReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Local outcome of a drag-end plus the handle of its persistence task
#[derive(Debug)]
pub struct DragEndResult {
    pub outcome: DragOutcome,
    /// `None` when nothing changed
    pub persist: Option<JoinHandle<PersistReport>>,
}
