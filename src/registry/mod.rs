// Provider resolution
pub mod driver_registry;

pub use driver_registry::*;
