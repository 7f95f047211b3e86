//! Logging setup for the connector factory.
//!
//! Level priority: `LogConfig::level`, then `RUST_LOG`, then `warn`.
//! Output goes to `LogConfig::file` when set, stderr otherwise.

use std::sync::{Mutex, OnceLock};
use tracing_subscriber::{
    fmt::{self, time::SystemTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::utils::config::LogConfig;

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the tracing subscriber. Only the first call has any effect.
pub fn init_logging(config: &LogConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        if let Some(ref level) = config.level {
            if level.eq_ignore_ascii_case("off") {
                return;
            }
        }

        let filter = match config.level {
            Some(ref level) => EnvFilter::new(format!("connector_factory={}", level.to_lowercase())),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("connector_factory=warn")),
        };

        if let Some(ref path) = config.file {
            let file = match std::fs::OpenOptions::new().create(true).append(true).open(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("connector-factory: failed to open log file {}: {}", path, e);
                    return;
                }
            };

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_timer(SystemTime),
                )
                .try_init()
                .ok();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_timer(SystemTime),
                )
                .try_init()
                .ok();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        let config = LogConfig {
            level: Some("debug".to_string()),
            file: None,
        };

        init_logging(&config);
        init_logging(&config);
        assert!(LOGGING_INITIALIZED.get().is_some());
    }
}
