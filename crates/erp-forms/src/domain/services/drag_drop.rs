//! Drag-and-drop reconciliation
//!
//! A drop event is turned into an explicit [`DropTarget`] by running an
//! ordered list of heuristics over the [`DropHints`] it carries. The first
//! heuristic that names a container wins. [`apply_drag_end`] then mutates the
//! form tree synchronously and reports the placement of every entity in the
//! containers it touched, so the caller can persist them.

use erp_common::EntityId;
use thiserror::Error;
use tracing::{debug, trace};

use crate::domain::aggregates::form::{resequence_fields, resequence_subforms};
use crate::domain::aggregates::{Container, Form, FormField, Subform};
use crate::domain::services::hierarchy::SubformHierarchy;
use crate::domain::value_objects::FieldType;

/// Droppable element id prefix for a subform body
pub const SUBFORM_PREFIX: &str = "subform-";
/// Droppable element id prefix for an empty section area
pub const SECTION_DROPZONE_PREFIX: &str = "section-dropzone-";

/// What is being dragged
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragSource {
    PaletteItem { field_type: FieldType, label: Option<String> },
    Field { id: EntityId },
    Subform { id: EntityId },
    Section { id: EntityId },
}

/// Everything a drop event may tell us about where it landed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DropHints {
    /// Id of the droppable element under the pointer
    pub over_id: Option<String>,
    /// Set by subform dropzones
    pub is_subform_dropzone: bool,
    pub dropzone_subform_id: Option<EntityId>,
    /// Subform id carried in the droppable's data payload
    pub over_subform_id: Option<EntityId>,
    /// Section id carried in the droppable's data payload
    pub over_section_id: Option<EntityId>,
}

impl DropHints {
    pub fn over(id: impl Into<String>) -> Self {
        Self { over_id: Some(id.into()), ..Self::default() }
    }

    pub fn subform_dropzone(subform_id: impl Into<EntityId>) -> Self {
        let subform_id = subform_id.into();
        Self {
            over_id: Some(format!("{}{}", SUBFORM_PREFIX, subform_id)),
            is_subform_dropzone: true,
            dropzone_subform_id: Some(subform_id),
            ..Self::default()
        }
    }

    pub fn section_dropzone(section_id: impl Into<EntityId>) -> Self {
        Self::over(format!("{}{}", SECTION_DROPZONE_PREFIX, section_id.into()))
    }
}

/// Resolved destination container
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DropTarget {
    Section { section_id: EntityId },
    Subform { section_id: EntityId, subform_id: EntityId },
}

impl DropTarget {
    pub fn container(&self) -> Container {
        match self {
            Self::Section { section_id } => Container::section(section_id.clone()),
            Self::Subform { subform_id, .. } => Container::subform(subform_id.clone()),
        }
    }

    pub fn section_id(&self) -> &EntityId {
        match self {
            Self::Section { section_id } | Self::Subform { section_id, .. } => section_id,
        }
    }
}

/// New placement of one entity after a drop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderUpdate {
    Field {
        id: EntityId,
        order: u32,
        container: Container,
    },
    Subform {
        id: EntityId,
        order: u32,
        section_id: EntityId,
        parent_subform_id: Option<EntityId>,
        level: u32,
    },
    Section {
        id: EntityId,
        order: u32,
    },
}

impl OrderUpdate {
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Field { id, .. } | Self::Subform { id, .. } | Self::Section { id, .. } => id,
        }
    }

    pub fn set_id(&mut self, new_id: EntityId) {
        match self {
            Self::Field { id, .. } | Self::Subform { id, .. } | Self::Section { id, .. } => *id = new_id,
        }
    }

    pub fn order(&self) -> u32 {
        match self {
            Self::Field { order, .. } | Self::Subform { order, .. } | Self::Section { order, .. } => {
                *order
            }
        }
    }
}

/// Result of a drag-end
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragOutcome {
    pub target: Option<DropTarget>,
    /// Field created from a palette drop, not yet known to the server
    pub created: Option<FormField>,
    pub updates: Vec<OrderUpdate>,
}

impl DragOutcome {
    pub fn is_noop(&self) -> bool {
        self.created.is_none() && self.updates.is_empty()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DropError {
    #[error("drop failed: no valid drop target")]
    NoTarget,

    #[error("cannot move subform {subform_id} into itself or one of its descendants")]
    Cycle { subform_id: EntityId },

    #[error("drag source {0} not found in form")]
    UnknownSource(EntityId),
}

type Heuristic = fn(&Form, &SubformHierarchy, &DropHints) -> Option<DropTarget>;

const HEURISTICS: [(&str, Heuristic); 6] = [
    ("explicit-flag", by_explicit_flag),
    ("prefixed-id", by_prefixed_id),
    ("tree-search", by_tree_search),
    ("over-data", by_over_data),
    ("section-dropzone", by_section_dropzone),
    ("proximity", by_proximity),
];

/// Resolve the destination container of a drop
///
/// Pure: never mutates the form.
pub fn resolve_drop_target(
    form: &Form,
    hierarchy: &SubformHierarchy,
    hints: &DropHints,
) -> Option<DropTarget> {
    HEURISTICS.iter().find_map(|(name, heuristic)| {
        let target = heuristic(form, hierarchy, hints)?;
        trace!(heuristic = *name, ?target, "drop target resolved");
        Some(target)
    })
}

fn subform_target(form: &Form, id: &EntityId) -> Option<DropTarget> {
    form.find_subform(id).map(|s| DropTarget::Subform {
        section_id: s.section_id.clone(),
        subform_id: s.id.clone(),
    })
}

fn by_explicit_flag(form: &Form, _: &SubformHierarchy, hints: &DropHints) -> Option<DropTarget> {
    if !hints.is_subform_dropzone {
        return None;
    }
    let id = hints.dropzone_subform_id.clone().or_else(|| {
        hints
            .over_id
            .as_deref()
            .and_then(|o| o.strip_prefix(SUBFORM_PREFIX))
            .map(EntityId::from)
    })?;
    subform_target(form, &id)
}

fn by_prefixed_id(_: &Form, hierarchy: &SubformHierarchy, hints: &DropHints) -> Option<DropTarget> {
    let id = EntityId::from(hints.over_id.as_deref()?.strip_prefix(SUBFORM_PREFIX)?);
    let entry = hierarchy.get(&id)?;
    Some(DropTarget::Subform { section_id: entry.section_id.clone(), subform_id: id })
}

fn by_tree_search(form: &Form, _: &SubformHierarchy, hints: &DropHints) -> Option<DropTarget> {
    let over = hints.over_id.as_deref()?;
    let candidate = over.strip_prefix(SUBFORM_PREFIX).unwrap_or(over);
    subform_target(form, &EntityId::from(candidate))
}

fn by_over_data(form: &Form, _: &SubformHierarchy, hints: &DropHints) -> Option<DropTarget> {
    subform_target(form, hints.over_subform_id.as_ref()?)
}

fn by_section_dropzone(form: &Form, _: &SubformHierarchy, hints: &DropHints) -> Option<DropTarget> {
    let over = hints.over_id.as_deref();
    let candidates = [
        over.and_then(|o| o.strip_prefix(SECTION_DROPZONE_PREFIX)),
        hints.over_section_id.as_ref().map(EntityId::as_str),
        over,
    ];
    candidates.into_iter().flatten().find_map(|id| {
        form.section(&EntityId::from(id))
            .map(|s| DropTarget::Section { section_id: s.id.clone() })
    })
}

fn by_proximity(form: &Form, _: &SubformHierarchy, hints: &DropHints) -> Option<DropTarget> {
    let field = form.find_field(&EntityId::from(hints.over_id.as_deref()?))?;
    match &field.container {
        Container::Section { section_id } => {
            Some(DropTarget::Section { section_id: section_id.clone() })
        }
        Container::Subform { subform_id } => subform_target(form, subform_id),
    }
}

/// Apply a drag-end to the form
///
/// `position` is the index in the destination container; when absent the
/// index of the entity under the pointer is used, else the item is appended.
/// The tree is left untouched on error.
pub fn apply_drag_end(
    form: &mut Form,
    hierarchy: &SubformHierarchy,
    source: &DragSource,
    hints: &DropHints,
    position: Option<usize>,
) -> Result<DragOutcome, DropError> {
    match source {
        DragSource::Field { id } => move_field(form, hierarchy, id, hints, position),
        DragSource::Subform { id } => move_subform(form, hierarchy, id, hints, position),
        DragSource::PaletteItem { field_type, label } => {
            create_from_palette(form, hierarchy, *field_type, label.as_deref(), hints, position)
        }
        DragSource::Section { id } => move_section(form, hierarchy, id, hints, position),
    }
}

fn over_index<T>(siblings: &[T], hints: &DropHints, id_of: impl Fn(&T) -> &EntityId) -> Option<usize> {
    let over = hints.over_id.as_deref()?;
    let over = over.strip_prefix(SUBFORM_PREFIX).unwrap_or(over);
    siblings.iter().position(|s| id_of(s).as_str() == over)
}

fn move_field(
    form: &mut Form,
    hierarchy: &SubformHierarchy,
    id: &EntityId,
    hints: &DropHints,
    position: Option<usize>,
) -> Result<DragOutcome, DropError> {
    let current = form
        .find_field(id)
        .ok_or_else(|| DropError::UnknownSource(id.clone()))?
        .container
        .clone();
    let target = resolve_drop_target(form, hierarchy, hints).ok_or(DropError::NoTarget)?;
    let dest = target.container();

    let siblings = form.fields_in(&dest).ok_or(DropError::NoTarget)?;
    let to = position.or_else(|| over_index(siblings.as_slice(), hints, |f| &f.id));

    if dest == current {
        let from = siblings
            .iter()
            .position(|f| &f.id == id)
            .ok_or_else(|| DropError::UnknownSource(id.clone()))?;
        let Some(to) = to else {
            return Ok(DragOutcome { target: Some(target), ..DragOutcome::default() });
        };
        let updates = reorder_fields(form, &dest, from, to)?;
        return Ok(DragOutcome { target: Some(target), created: None, updates });
    }

    let (source, _, field) = form
        .take_field(id)
        .ok_or_else(|| DropError::UnknownSource(id.clone()))?;
    form.insert_field(&dest, to, field);
    debug!(field = %id, from = ?source, to = ?dest, "field moved");

    let mut updates = field_updates(form, &source);
    updates.extend(field_updates(form, &dest));
    Ok(DragOutcome { target: Some(target), created: None, updates })
}

/// Move a field inside one container from index `from` to index `to`
///
/// Returns no updates when the position does not change.
pub fn reorder_fields(
    form: &mut Form,
    container: &Container,
    from: usize,
    to: usize,
) -> Result<Vec<OrderUpdate>, DropError> {
    let fields = form.fields_in_mut(container).ok_or(DropError::NoTarget)?;
    if from >= fields.len() {
        return Err(DropError::NoTarget);
    }
    let to = to.min(fields.len() - 1);
    if from == to {
        return Ok(vec![]);
    }
    let field = fields.remove(from);
    fields.insert(to, field);
    resequence_fields(fields);
    Ok(field_updates(form, container))
}

fn field_updates(form: &Form, container: &Container) -> Vec<OrderUpdate> {
    form.fields_in(container)
        .map(|fields| {
            fields
                .iter()
                .map(|f| OrderUpdate::Field {
                    id: f.id.clone(),
                    order: f.order,
                    container: f.container.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn move_subform(
    form: &mut Form,
    hierarchy: &SubformHierarchy,
    id: &EntityId,
    hints: &DropHints,
    position: Option<usize>,
) -> Result<DragOutcome, DropError> {
    let current = form
        .find_subform(id)
        .ok_or_else(|| DropError::UnknownSource(id.clone()))?
        .container();
    let target = resolve_drop_target(form, hierarchy, hints).ok_or(DropError::NoTarget)?;

    if let DropTarget::Subform { subform_id, .. } = &target {
        if form.is_self_or_descendant(id, subform_id) {
            return Err(DropError::Cycle { subform_id: id.clone() });
        }
    }

    let dest = target.container();
    let siblings = form.subforms_in(&dest).ok_or(DropError::NoTarget)?;
    let to = position.or_else(|| over_index(siblings.as_slice(), hints, |s| &s.id));

    if dest == current {
        let from = siblings
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| DropError::UnknownSource(id.clone()))?;
        let Some(to) = to.map(|t| t.min(siblings.len() - 1)).filter(|to| *to != from) else {
            return Ok(DragOutcome { target: Some(target), ..DragOutcome::default() });
        };
        let siblings = form.subforms_in_mut(&dest).ok_or(DropError::NoTarget)?;
        let sub = siblings.remove(from);
        siblings.insert(to, sub);
        resequence_subforms(siblings);
        let updates = subform_updates(form, &dest);
        return Ok(DragOutcome { target: Some(target), created: None, updates });
    }

    let (source, _, sub) = form
        .take_subform(id)
        .ok_or_else(|| DropError::UnknownSource(id.clone()))?;
    form.insert_subform(&dest, to, sub);
    debug!(subform = %id, from = ?source, to = ?dest, "subform moved");

    let mut updates = subform_updates(form, &source);
    updates.extend(subform_updates(form, &dest));
    if let Some(moved) = form.find_subform(id) {
        let mut descendants = Vec::new();
        collect_descendant_updates(moved, &mut descendants);
        updates.extend(descendants);
    }
    Ok(DragOutcome { target: Some(target), created: None, updates })
}

fn subform_update(s: &Subform) -> OrderUpdate {
    OrderUpdate::Subform {
        id: s.id.clone(),
        order: s.order,
        section_id: s.section_id.clone(),
        parent_subform_id: s.parent_subform_id.clone(),
        level: s.level,
    }
}

fn subform_updates(form: &Form, container: &Container) -> Vec<OrderUpdate> {
    form.subforms_in(container)
        .map(|subs| subs.iter().map(subform_update).collect())
        .unwrap_or_default()
}

fn collect_descendant_updates(sub: &Subform, out: &mut Vec<OrderUpdate>) {
    for child in &sub.child_subforms {
        out.push(subform_update(child));
        collect_descendant_updates(child, out);
    }
}

fn create_from_palette(
    form: &mut Form,
    hierarchy: &SubformHierarchy,
    field_type: FieldType,
    label: Option<&str>,
    hints: &DropHints,
    position: Option<usize>,
) -> Result<DragOutcome, DropError> {
    let target = resolve_drop_target(form, hierarchy, hints).ok_or(DropError::NoTarget)?;
    let dest = target.container();
    let siblings = form.fields_in(&dest).ok_or(DropError::NoTarget)?;
    let to = position.or_else(|| over_index(siblings.as_slice(), hints, |f| &f.id));

    let field = FormField::new(label.unwrap_or(field_type.default_label()), field_type, dest.clone());
    let new_id = field.id.clone();
    form.insert_field(&dest, to, field);

    let created = form.find_field(&new_id).cloned();
    let updates = field_updates(form, &dest)
        .into_iter()
        .filter(|u| u.id() != &new_id)
        .collect();
    debug!(field = %new_id, ?field_type, to = ?dest, "field created from palette");
    Ok(DragOutcome { target: Some(target), created, updates })
}

fn move_section(
    form: &mut Form,
    hierarchy: &SubformHierarchy,
    id: &EntityId,
    hints: &DropHints,
    position: Option<usize>,
) -> Result<DragOutcome, DropError> {
    let from = form
        .sections
        .iter()
        .position(|s| &s.id == id)
        .ok_or_else(|| DropError::UnknownSource(id.clone()))?;
    let target = resolve_drop_target(form, hierarchy, hints).ok_or(DropError::NoTarget)?;
    let to = match position {
        Some(p) => p.min(form.sections.len() - 1),
        None => form
            .sections
            .iter()
            .position(|s| s.id == *target.section_id())
            .ok_or(DropError::NoTarget)?,
    };
    if from == to {
        return Ok(DragOutcome { target: Some(target), ..DragOutcome::default() });
    }

    let section = form.sections.remove(from);
    form.sections.insert(to, section);
    form.resequence_sections();

    let updates = form
        .sections
        .iter()
        .map(|s| OrderUpdate::Section { id: s.id.clone(), order: s.order })
        .collect();
    Ok(DragOutcome { target: Some(target), created: None, updates })
}
