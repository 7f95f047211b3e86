use std::sync::Arc;
use tracing::debug;

use crate::drivers::{DbCommand, DbConnection, SharedFactory};
use crate::registry::DriverRegistry;
use crate::utils::{
    error::{FactoryError, FactoryResult},
    types::{ConnectionState, ProviderType},
};

/// Connection handed to the caller, tagged with the provider it was resolved for.
///
/// The handle is returned unopened; the factory never opens, closes or pools it.
pub struct ConnectionHandle {
    provider: ProviderType,
    driver: SharedFactory,
    connection: Box<dyn DbConnection>,
}

impl ConnectionHandle {
    pub fn provider(&self) -> ProviderType {
        self.provider
    }

    /// Factory the connection was produced by
    pub fn driver(&self) -> &SharedFactory {
        &self.driver
    }

    pub fn connection_string(&self) -> &str {
        self.connection.connection_string()
    }

    pub fn set_connection_string(&mut self, connection_string: &str) {
        self.connection.set_connection_string(connection_string);
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub async fn open(&mut self) -> FactoryResult<()> {
        self.connection.open().await
    }

    pub async fn close(&mut self) -> FactoryResult<()> {
        self.connection.close().await
    }

    pub fn create_command(&self, command_text: &str) -> DbCommand {
        self.connection.create_command(command_text)
    }

    /// Give up the provider tag and take the raw driver connection
    pub fn into_inner(self) -> Box<dyn DbConnection> {
        self.connection
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("provider", &self.provider)
            .field("driver", &self.driver.name())
            .field("state", &self.connection.state())
            .finish()
    }
}

/// Creates connections for a provider without the caller knowing which
/// driver implementations are present.
#[derive(Clone)]
pub struct ConnectionFactory {
    registry: Arc<DriverRegistry>,
}

impl ConnectionFactory {
    pub fn new(registry: Arc<DriverRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<DriverRegistry> {
        &self.registry
    }

    /// Create an unopened connection for `provider`.
    ///
    /// An empty or whitespace-only connection string is rejected before any
    /// resolution work; any other string reaches the driver unmodified.
    pub fn create(&self, provider: ProviderType, connection_string: &str) -> FactoryResult<ConnectionHandle> {
        ensure_connection_string(connection_string)?;

        let driver = self.registry.resolve(provider)?;
        Ok(Self::build_handle(provider, driver, connection_string))
    }

    /// Create an unopened connection for a provider name or alias
    pub fn create_by_name(&self, provider_name: &str, connection_string: &str) -> FactoryResult<ConnectionHandle> {
        ensure_connection_string(connection_string)?;

        let (provider, driver) = self.registry.resolve_name(provider_name)?;
        Ok(Self::build_handle(provider, driver, connection_string))
    }

    /// Fix the provider and connection string for repeated connection creation
    pub fn bind(&self, provider: ProviderType, connection_string: Option<String>) -> BoundConnectionFactory {
        BoundConnectionFactory {
            factory: self.clone(),
            provider,
            connection_string,
        }
    }

    fn build_handle(provider: ProviderType, driver: SharedFactory, connection_string: &str) -> ConnectionHandle {
        let mut connection = driver.create_connection();
        connection.set_connection_string(connection_string);
        debug!(%provider, driver = driver.name(), "connection created");

        ConnectionHandle {
            provider,
            driver,
            connection,
        }
    }
}

/// Uses the process-wide registry
impl Default for ConnectionFactory {
    fn default() -> Self {
        Self::new(DriverRegistry::global())
    }
}

/// Factory bound to one provider and an optional connection string
#[derive(Clone)]
pub struct BoundConnectionFactory {
    factory: ConnectionFactory,
    provider: ProviderType,
    connection_string: Option<String>,
}

impl BoundConnectionFactory {
    pub fn provider(&self) -> ProviderType {
        self.provider
    }

    pub fn connection_string(&self) -> Option<&str> {
        self.connection_string.as_deref()
    }

    /// New unopened connection; fails if no connection string was bound
    pub fn create_connection(&self) -> FactoryResult<ConnectionHandle> {
        let connection_string = self.connection_string
            .as_deref()
            .ok_or(FactoryError::MissingConnectionString)?;
        self.factory.create(self.provider, connection_string)
    }
}

fn ensure_connection_string(connection_string: &str) -> FactoryResult<()> {
    if connection_string.trim().is_empty() {
        return Err(FactoryError::MissingConnectionString);
    }
    Ok(())
}
