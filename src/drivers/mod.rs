// Driver contract and bundled drivers
pub mod driver_trait;
pub mod mock_driver;
pub mod postgres_driver;
pub mod sqlserver_driver;

pub use driver_trait::*;
pub use mock_driver::*;
pub use postgres_driver::*;
pub use sqlserver_driver::*;
