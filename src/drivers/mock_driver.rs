use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use crate::drivers::driver_trait::{DbCommand, DbConnection, DriverFactory};
use crate::utils::{
    types::ConnectionState,
    error::{ConnectionError, FactoryResult},
};

/// In-memory driver for tests and demos; opening performs no I/O
#[derive(Debug)]
pub struct MockDriverFactory {
    name: String,
    open_delay_ms: u64,
    fail_open: bool,
    created: AtomicUsize,
}

impl MockDriverFactory {
    /// Create a mock driver reporting the given implementation name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            open_delay_ms: 0,
            fail_open: false,
            created: AtomicUsize::new(0),
        }
    }

    /// Simulate a connection delay on open
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.open_delay_ms = delay_ms;
        self
    }

    /// Connections from this driver refuse to open
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Number of connections handed out so far
    pub fn connections_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl DriverFactory for MockDriverFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_connection(&self) -> Box<dyn DbConnection> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(MockConnection {
            connection_string: String::new(),
            state: ConnectionState::Closed,
            open_delay_ms: self.open_delay_ms,
            fail_open: self.fail_open,
        })
    }
}

/// Connection produced by [`MockDriverFactory`]
#[derive(Debug)]
pub struct MockConnection {
    connection_string: String,
    state: ConnectionState,
    open_delay_ms: u64,
    fail_open: bool,
}

#[async_trait]
impl DbConnection for MockConnection {
    fn connection_string(&self) -> &str {
        &self.connection_string
    }

    fn set_connection_string(&mut self, connection_string: &str) {
        self.connection_string = connection_string.to_string();
    }

    async fn open(&mut self) -> FactoryResult<()> {
        if self.state == ConnectionState::Open {
            return Err(ConnectionError::AlreadyOpen.into());
        }
        if self.open_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.open_delay_ms)).await;
        }
        if self.fail_open {
            return Err(ConnectionError::ConnectionFailed(
                "mock driver configured to refuse connections".to_string()
            ).into());
        }

        self.state = ConnectionState::Open;
        Ok(())
    }

    async fn close(&mut self) -> FactoryResult<()> {
        self.state = ConnectionState::Closed;
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn create_command(&self, command_text: &str) -> DbCommand {
        DbCommand::new(command_text)
    }
}
