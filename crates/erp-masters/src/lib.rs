//! OpenERP Masters
//!
//! Machine and product master data behind one generic CRUD service.
//! Each record kind implements [`Master`], which owns its validation.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use application::MasterService;
pub use domain::{
    Machine, MachineDraft, MachinePatch, MachineStatus, Master, Product, ProductDraft,
    ProductPatch, ProductStatus,
};
pub use error::{MasterError, Result};
pub use infrastructure::InMemoryMasterRepository;
pub use ports::MasterRepository;
