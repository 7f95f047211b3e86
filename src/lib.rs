pub mod drivers;
pub mod loader;
pub mod registry;
pub mod factory;
pub mod cli;
pub mod utils;

pub use drivers::*;
pub use loader::*;
pub use registry::*;
pub use factory::*;
pub use cli::*;
pub use utils::*;
