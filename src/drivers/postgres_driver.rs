use async_trait::async_trait;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, Config, NoTls};
use tracing::{debug, warn};

use crate::drivers::driver_trait::{DbCommand, DbConnection, DriverFactory};
use crate::utils::{
    types::ConnectionState,
    error::{ConnectionError, FactoryResult},
};

pub const NPGSQL_FACTORY_NAME: &str = "Npgsql.NpgsqlFactory";
pub const NPGSQL_ORIGIN: &str = "Npgsql";

/// PostgreSQL driver using tokio-postgres.
///
/// Shipped as the loadable `Npgsql` origin rather than a built-in, so it is
/// only reachable once the origin has been loaded.
#[derive(Debug, Clone, Default)]
pub struct NpgsqlFactory;

impl DriverFactory for NpgsqlFactory {
    fn name(&self) -> &str {
        NPGSQL_FACTORY_NAME
    }

    fn create_connection(&self) -> Box<dyn DbConnection> {
        Box::new(PostgresConnection::new())
    }
}

/// PostgreSQL connection; accepts libpq key/value strings and URLs
pub struct PostgresConnection {
    connection_string: String,
    client: Option<Client>,
    driver_task: Option<JoinHandle<()>>,
}

impl PostgresConnection {
    fn new() -> Self {
        Self {
            connection_string: String::new(),
            client: None,
            driver_task: None,
        }
    }

    /// Parse the connection string into a tokio-postgres configuration
    pub fn parse_config(&self) -> FactoryResult<Config> {
        let mut config: Config = self.connection_string.parse()
            .map_err(|e: tokio_postgres::Error| ConnectionError::InvalidConnectionString(e.to_string()))?;
        if config.get_connect_timeout().is_none() {
            config.connect_timeout(Duration::from_secs(30));
        }
        Ok(config)
    }
}

#[async_trait]
impl DbConnection for PostgresConnection {
    fn connection_string(&self) -> &str {
        &self.connection_string
    }

    fn set_connection_string(&mut self, connection_string: &str) {
        self.connection_string = connection_string.to_string();
    }

    async fn open(&mut self) -> FactoryResult<()> {
        if self.client.is_some() {
            return Err(ConnectionError::AlreadyOpen.into());
        }

        let config = self.parse_config()?;
        debug!(hosts = ?config.get_hosts(), "opening PostgreSQL connection");

        let (client, connection) = config.connect(NoTls).await
            .map_err(|e| ConnectionError::ConnectionFailed(format!("Failed to connect: {}", e)))?;

        self.driver_task = Some(tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "PostgreSQL connection terminated");
            }
        }));
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> FactoryResult<()> {
        // Dropping the client ends the background connection task.
        self.client = None;
        if let Some(task) = self.driver_task.take() {
            let _ = task.await;
        }
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        match &self.client {
            Some(client) if !client.is_closed() => ConnectionState::Open,
            _ => ConnectionState::Closed,
        }
    }

    fn create_command(&self, command_text: &str) -> DbCommand {
        DbCommand::new(command_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::FactoryError;

    #[test]
    fn test_npgsql_factory_name() {
        assert_eq!(NpgsqlFactory.name(), "Npgsql.NpgsqlFactory");
    }

    #[test]
    fn test_parse_key_value_connection_string() {
        let mut connection = PostgresConnection::new();
        connection.set_connection_string("host=localhost port=5432 user=postgres dbname=app");

        let config = connection.parse_config().unwrap();
        assert_eq!(config.get_user(), Some("postgres"));
        assert_eq!(config.get_dbname(), Some("app"));
        assert_eq!(config.get_ports(), &[5432]);
        assert_eq!(config.get_connect_timeout(), Some(&Duration::from_secs(30)));
    }

    #[test]
    fn test_parse_url_connection_string() {
        let mut connection = PostgresConnection::new();
        connection.set_connection_string("postgresql://app@db.internal:6543/orders?connect_timeout=5");

        let config = connection.parse_config().unwrap();
        assert_eq!(config.get_user(), Some("app"));
        assert_eq!(config.get_ports(), &[6543]);
        assert_eq!(config.get_connect_timeout(), Some(&Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_open_rejects_malformed_connection_string() {
        let mut connection = NpgsqlFactory.create_connection();
        connection.set_connection_string("host=localhost port=notaport");

        let result = connection.open().await;
        assert!(matches!(
            result,
            Err(FactoryError::Connection(ConnectionError::InvalidConnectionString(_)))
        ));
        assert_eq!(connection.state(), ConnectionState::Closed);
    }
}
