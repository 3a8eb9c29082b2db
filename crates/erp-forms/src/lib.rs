//! OpenERP Forms
//!
//! Dynamic form builder and runtime for the ERP workspace.
//!
//! ## Architecture
//!
//! - **Domain Layer**: the form tree aggregate, hierarchy paths, drag-and-drop
//!   reconciliation, runtime validation and submission
//! - **Application Layer**: builder and runtime services
//! - **Ports Layer**: backend gateway and notification traits
//! - **Infrastructure Layer**: in-memory adapters
//!
//! ## Key Aggregates
//!
//! - **Form**: sections holding fields and arbitrarily nested subforms
//! - **FormRecord**: flat submission keyed by field id

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use application::{BuilderConfig, FormBuilderService, FormRuntimeService};
pub use domain::aggregates::{Container, Form, FormField, FormRecord, Section, Subform};
pub use domain::events::{FormEvent, FormEventKind};
pub use domain::services::{
    build_subform_hierarchy_map, DragSource, DropError, DropHints, DropTarget, OrderUpdate,
    SubformHierarchy,
};
pub use domain::value_objects::{FieldType, FormStatus, LookupConfig, LookupSelection};
pub use error::{FormsError, Result};
pub use ports::{FormGateway, GatewayError, Notifier, Toast};
