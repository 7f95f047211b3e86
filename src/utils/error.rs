use std::path::PathBuf;
use thiserror::Error;

use crate::utils::types::{DriverReference, ProviderType};

/// Main error type for provider resolution and connection creation
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Connection string not found")]
    MissingConnectionString,

    #[error("Unsupported provider: {name}")]
    UnsupportedProvider { name: String },

    #[error("Provider {provider} is unavailable, attempted: [{}]", format_candidates(.attempted))]
    ProviderUnavailable {
        provider: ProviderType,
        attempted: Vec<DriverReference>,
    },

    #[error("Unable to retrieve driver factory from {reference}")]
    DriverLoad { reference: DriverReference },

    #[error("Provider {0} already has a registered driver")]
    AlreadyRegistered(ProviderType),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors raised by driver connections while opening or closing a session
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Timeout occurred: {0}")]
    Timeout(String),

    #[error("Connection is already open")]
    AlreadyOpen,
}

/// Failures of the code-loading subsystem
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Origin not found: {0}")]
    OriginNotFound(String),

    #[error("Path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Path does not contain a known code unit: {}", .0.display())]
    PathNotRecognized(PathBuf),
}

/// Failures reading a static member of an exported type
#[derive(Debug, Error)]
pub enum MemberAccessError {
    #[error("Static member not found: {0}")]
    MemberNotFound(String),

    #[error("Static member access faulted: {0}")]
    Faulted(String),
}

fn format_candidates(candidates: &[DriverReference]) -> String {
    candidates
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for factory operations
pub type FactoryResult<T> = Result<T, FactoryError>;
