use async_trait::async_trait;
use std::sync::Arc;
use crate::utils::{
    types::ConnectionState,
    error::FactoryResult,
};

/// Command text bound to a connection; execution belongs to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct DbCommand {
    pub command_text: String,
    pub timeout_seconds: u64,
}

impl DbCommand {
    /// Create a new command with the default timeout
    pub fn new(command_text: &str) -> Self {
        Self {
            command_text: command_text.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Connection object produced by a driver.
///
/// A fresh connection is closed; opening it is the caller's business.
#[async_trait]
pub trait DbConnection: Send + Sync {
    /// Connection string exactly as it was set
    fn connection_string(&self) -> &str;

    fn set_connection_string(&mut self, connection_string: &str);

    /// Establish the session with the database
    async fn open(&mut self) -> FactoryResult<()>;

    /// Tear down the session; closing a closed connection is a no-op
    async fn close(&mut self) -> FactoryResult<()>;

    fn state(&self) -> ConnectionState;

    /// Create a command bound to this connection
    fn create_command(&self, command_text: &str) -> DbCommand;
}

/// Singleton capability of a driver: producing unopened connections
pub trait DriverFactory: Send + Sync {
    /// Name of the driver implementation, e.g. `Npgsql.NpgsqlFactory`
    fn name(&self) -> &str;

    fn create_connection(&self) -> Box<dyn DbConnection>;
}

/// Factory handle shared between the registry cache and its callers
pub type SharedFactory = Arc<dyn DriverFactory>;
