// Code loading and driver materialization
pub mod code_unit;
pub mod dynamic_loader;
pub mod module_catalog;

pub use code_unit::*;
pub use dynamic_loader::*;
pub use module_catalog::*;
