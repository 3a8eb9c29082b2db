//! Subform hierarchy paths
//!
//! Paths like "1.2.1" are derived from sibling order and the ancestor chain
//! every time the tree changes. They are never persisted.

use erp_common::EntityId;
use std::collections::HashMap;

use crate::domain::aggregates::{Form, Subform};

/// Position of one subform in its section's forest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchyEntry {
    pub path: String,
    pub level: u32,
    pub parent_path: Option<String>,
    pub section_id: EntityId,
    pub parent_subform_id: Option<EntityId>,
    pub children: Vec<EntityId>,
}

/// Flat `subform_id -> entry` lookup rebuilt from the tree
#[derive(Clone, Debug, Default)]
pub struct SubformHierarchy {
    entries: HashMap<EntityId, HierarchyEntry>,
}

impl SubformHierarchy {
    pub fn get(&self, id: &EntityId) -> Option<&HierarchyEntry> {
        self.entries.get(id)
    }

    pub fn path(&self, id: &EntityId) -> Option<&str> {
        self.entries.get(id).map(|e| e.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &HierarchyEntry)> {
        self.entries.iter()
    }
}

/// Depth-first walk of every section's subform forest
///
/// Siblings are indexed in `order` sequence, 1-based; roots of each section
/// start again at "1". Level is the depth below the section (roots are 0).
pub fn build_subform_hierarchy_map(form: &Form) -> SubformHierarchy {
    let mut hierarchy = SubformHierarchy::default();
    for section in &form.sections {
        visit_siblings(&section.subforms, &section.id, None, None, 0, &mut hierarchy);
    }
    hierarchy
}

fn visit_siblings(
    siblings: &[Subform],
    section_id: &EntityId,
    parent_path: Option<&str>,
    parent_id: Option<&EntityId>,
    level: u32,
    out: &mut SubformHierarchy,
) {
    let mut ordered: Vec<&Subform> = siblings.iter().collect();
    ordered.sort_by_key(|s| s.order);

    for (idx, sub) in ordered.into_iter().enumerate() {
        let path = match parent_path {
            Some(p) => format!("{}.{}", p, idx + 1),
            None => (idx + 1).to_string(),
        };

        let mut children: Vec<&Subform> = sub.child_subforms.iter().collect();
        children.sort_by_key(|c| c.order);

        out.entries.insert(
            sub.id.clone(),
            HierarchyEntry {
                path: path.clone(),
                level,
                parent_path: parent_path.map(str::to_string),
                section_id: section_id.clone(),
                parent_subform_id: parent_id.cloned(),
                children: children.iter().map(|c| c.id.clone()).collect(),
            },
        );

        visit_siblings(&sub.child_subforms, section_id, Some(&path), Some(&sub.id), level + 1, out);
    }
}
