//! Domain layer

pub mod machine;
pub mod master;
pub mod product;

pub use machine::*;
pub use master::*;
pub use product::*;
