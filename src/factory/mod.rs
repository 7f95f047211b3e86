// Public connection factory
pub mod connection_factory;

pub use connection_factory::*;
