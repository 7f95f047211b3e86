use async_trait::async_trait;
use std::time::Duration;
use tiberius::{Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{TokioAsyncWriteCompatExt, Compat};
use tracing::debug;

use crate::drivers::driver_trait::{DbCommand, DbConnection, DriverFactory};
use crate::utils::{
    types::ConnectionState,
    error::{ConnectionError, FactoryResult},
};

pub const SQL_CLIENT_FACTORY_NAME: &str = "System.Data.SqlClient.SqlClientFactory";

/// Built-in SQL Server driver using tiberius; always available
#[derive(Debug, Clone)]
pub struct SqlClientFactory {
    connect_timeout: Duration,
}

impl SqlClientFactory {
    /// Create a new SQL Server driver
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Set the TCP connect timeout used by connections from this driver
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for SqlClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverFactory for SqlClientFactory {
    fn name(&self) -> &str {
        SQL_CLIENT_FACTORY_NAME
    }

    fn create_connection(&self) -> Box<dyn DbConnection> {
        Box::new(SqlServerConnection::new(self.connect_timeout))
    }
}

/// SQL Server connection; the connection string uses ADO.NET syntax
pub struct SqlServerConnection {
    connection_string: String,
    client: Option<Client<Compat<TcpStream>>>,
    connect_timeout: Duration,
}

impl SqlServerConnection {
    fn new(connect_timeout: Duration) -> Self {
        Self {
            connection_string: String::new(),
            client: None,
            connect_timeout,
        }
    }

    /// Parse the ADO.NET connection string into a tiberius configuration
    pub fn parse_config(&self) -> FactoryResult<Config> {
        Config::from_ado_string(&self.connection_string)
            .map_err(|e| ConnectionError::InvalidConnectionString(e.to_string()).into())
    }
}

#[async_trait]
impl DbConnection for SqlServerConnection {
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
        let addr = config.get_addr();
        debug!(%addr, "opening SQL Server connection");

        let tcp = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&addr)).await
            .map_err(|_| ConnectionError::Timeout(format!("Connection to {} timed out", addr)))?
            .map_err(|e| ConnectionError::ConnectionFailed(format!("Failed to connect: {}", e)))?;
        tcp.set_nodelay(true)
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;

        let client = Client::connect(config, tcp.compat_write()).await
            .map_err(|e| ConnectionError::ConnectionFailed(format!("Failed to authenticate: {}", e)))?;

        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> FactoryResult<()> {
        if let Some(client) = self.client.take() {
            client.close().await
                .map_err(|e| ConnectionError::ConnectionFailed(format!("Failed to close: {}", e)))?;
        }
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        if self.client.is_some() {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    fn create_command(&self, command_text: &str) -> DbCommand {
        DbCommand::new(command_text)
    }
}
