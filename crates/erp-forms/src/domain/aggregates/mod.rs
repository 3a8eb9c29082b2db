//! Aggregates module

pub mod form;
pub mod record;

pub use form::{Container, Form, FormField, Section, Subform};
pub use record::{FormRecord, RecordStatus};
