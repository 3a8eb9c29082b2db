//! Domain services module
//!
//! Stateless operations over the form tree.

pub mod drag_drop;
pub mod hierarchy;
pub mod runtime;

pub use drag_drop::{
    apply_drag_end, reorder_fields, resolve_drop_target, DragOutcome, DragSource, DropError,
    DropHints, DropTarget, OrderUpdate,
};
pub use hierarchy::{build_subform_hierarchy_map, HierarchyEntry, SubformHierarchy};
pub use runtime::{
    apply_lookup_autofill, build_submission, completion_percentage, validate_field,
    validate_form, FieldErrors, FormData,
};
