use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::FactoryError;

/// Database dialects a connection string can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderType {
    SqlServer,
    SqLite,
    MySql,
    PostgreSql,
    OleDb,
    SqlServerCompact,
}

impl ProviderType {
    /// Every provider, in declaration order
    pub fn all() -> [ProviderType; 6] {
        [
            ProviderType::SqlServer,
            ProviderType::SqLite,
            ProviderType::MySql,
            ProviderType::PostgreSql,
            ProviderType::OleDb,
            ProviderType::SqlServerCompact,
        ]
    }

    /// Canonical name, also accepted as an alias during name resolution
    pub fn name(&self) -> &'static str {
        match self {
            ProviderType::SqlServer => "SqlServer",
            ProviderType::SqLite => "SqLite",
            ProviderType::MySql => "MySql",
            ProviderType::PostgreSql => "PostgreSql",
            ProviderType::OleDb => "OleDb",
            ProviderType::SqlServerCompact => "SqlServerCompact",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Symbolic pointer to a driver factory: a fully-qualified type name plus
/// the origin to load when the type is not yet present in the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverReference {
    pub type_name: String,
    pub origin_hint: Option<String>,
}

impl DriverReference {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            origin_hint: None,
        }
    }

    /// Reference whose type lives in `origin`
    pub fn with_origin(type_name: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            origin_hint: Some(origin.into()),
        }
    }

    pub fn origin_hint(&self) -> Option<&str> {
        self.origin_hint.as_deref()
    }
}

impl fmt::Display for DriverReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin_hint {
            Some(origin) => write!(f, "{}, {}", self.type_name, origin),
            None => f.write_str(&self.type_name),
        }
    }
}

/// Parses the qualified form `"Type.Name, Origin"`; the origin part is optional.
impl FromStr for DriverReference {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (type_name, origin) = match s.split_once(',') {
            Some((type_name, origin)) => (type_name.trim(), Some(origin.trim())),
            None => (s.trim(), None),
        };

        if type_name.is_empty() {
            return Err(FactoryError::Configuration(format!("driver reference '{}' has no type name", s)));
        }

        Ok(Self {
            type_name: type_name.to_string(),
            origin_hint: origin.filter(|o| !o.is_empty()).map(str::to_string),
        })
    }
}

/// Lifecycle of a connection handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Closed,
    Open,
}

/// Per-provider resolution state held by the registry.
///
/// `Resolved` is permanent for the life of the registry. `Unavailable` is
/// only a record of the last failure: the next resolution retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionState {
    Unresolved,
    Resolving,
    Resolved,
    Unavailable,
}
