use serde::{Deserialize, Serialize};
use crate::utils::{
    error::FactoryResult,
    types::{DriverReference, ProviderType},
};

/// Well-known accessor every driver type exposes its singleton factory under
pub const DEFAULT_INSTANCE_ACCESSOR: &str = "Instance";

/// One provider's aliases and ordered driver candidates
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEntry {
    pub provider: ProviderType,
    pub aliases: Vec<String>,
    /// Tried in order; the first to materialize wins
    pub candidates: Vec<DriverReference>,
}

impl ProviderEntry {
    pub fn new(provider: ProviderType) -> Self {
        Self {
            provider,
            aliases: Vec::new(),
            candidates: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_candidate(mut self, type_name: &str, origin: &str) -> Self {
        self.candidates.push(DriverReference::with_origin(type_name, origin));
        self
    }

    /// Append a candidate written as `"Type.Name, Origin"`
    pub fn with_qualified_candidate(mut self, qualified: &str) -> FactoryResult<Self> {
        self.candidates.push(qualified.parse()?);
        Ok(self)
    }

    fn matches(&self, name: &str) -> bool {
        self.provider.name().eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }
}

/// Table of known providers handed to the registry at construction
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderCatalog {
    pub entries: Vec<ProviderEntry>,
}

impl ProviderCatalog {
    /// Catalog with no providers
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add or replace the entry for a provider
    pub fn with_entry(mut self, entry: ProviderEntry) -> Self {
        self.entries.retain(|e| e.provider != entry.provider);
        self.entries.push(entry);
        self
    }

    pub fn entry(&self, provider: ProviderType) -> Option<&ProviderEntry> {
        self.entries.iter().find(|e| e.provider == provider)
    }

    /// Ordered candidates for a provider, empty when it is not listed
    pub fn candidates(&self, provider: ProviderType) -> &[DriverReference] {
        self.entry(provider)
            .map(|e| e.candidates.as_slice())
            .unwrap_or(&[])
    }

    /// Map a provider name or alias to its provider, ignoring ASCII case
    pub fn provider_for_name(&self, name: &str) -> Option<ProviderType> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|e| e.matches(name))
            .map(|e| e.provider)
    }
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self {
            entries: vec![
                ProviderEntry::new(ProviderType::SqlServer)
                    .with_alias("system.data.sqlclient")
                    .with_alias("sqlserver")
                    .with_candidate("System.Data.SqlClient.SqlClientFactory", "System.Data.SqlClient"),
                ProviderEntry::new(ProviderType::SqLite)
                    .with_alias("microsoft.data.sqlite")
                    .with_alias("system.data.sqlite")
                    .with_alias("sqlite")
                    .with_candidate("Microsoft.Data.Sqlite.SqliteFactory", "Microsoft.Data.Sqlite")
                    .with_candidate("System.Data.SQLite.SQLiteFactory", "System.Data.SQLite"),
                ProviderEntry::new(ProviderType::MySql)
                    .with_alias("mysql.data.mysqlclient")
                    .with_alias("mysql.data")
                    .with_alias("mysql")
                    .with_candidate("MySql.Data.MySqlClient.MySqlClientFactory", "MySql.Data"),
                ProviderEntry::new(ProviderType::PostgreSql)
                    .with_alias("npgsql")
                    .with_alias("postgresql")
                    .with_alias("postgres")
                    .with_candidate("Npgsql.NpgsqlFactory", "Npgsql"),
                ProviderEntry::new(ProviderType::OleDb)
                    .with_alias("system.data.oledb")
                    .with_candidate("System.Data.OleDb.OleDbFactory", "System.Data.OleDb"),
                ProviderEntry::new(ProviderType::SqlServerCompact)
                    .with_alias("system.data.sqlserverce.4.0")
                    .with_candidate("System.Data.SqlServerCe.SqlCeProviderFactory", "System.Data.SqlServerCe.4.0"),
            ],
        }
    }
}

/// Dynamic loader configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoaderConfig {
    pub instance_accessor: String,
    /// Treat an origin hint as a filesystem path when loading by name fails
    pub allow_path_loading: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            instance_accessor: DEFAULT_INSTANCE_ACCESSOR.to_string(),
            allow_path_loading: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LogConfig {
    /// "off", "error", "warn", "info", "debug" or "trace"
    pub level: Option<String>,
    /// Log file path; stderr when unset
    pub file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_covers_every_provider() {
        let catalog = ProviderCatalog::default();

        for provider in ProviderType::all() {
            assert!(catalog.entry(provider).is_some(), "missing {}", provider);
            assert!(!catalog.candidates(provider).is_empty());
        }
    }

    #[test]
    fn test_default_catalog_sqlite_candidate_order() {
        let catalog = ProviderCatalog::default();
        let candidates = catalog.candidates(ProviderType::SqLite);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].type_name, "Microsoft.Data.Sqlite.SqliteFactory");
        assert_eq!(candidates[0].origin_hint(), Some("Microsoft.Data.Sqlite"));
        assert_eq!(candidates[1].type_name, "System.Data.SQLite.SQLiteFactory");
    }

    #[test]
    fn test_provider_for_name_is_case_insensitive() {
        let catalog = ProviderCatalog::default();

        assert_eq!(catalog.provider_for_name("Microsoft.Data.Sqlite"), Some(ProviderType::SqLite));
        assert_eq!(catalog.provider_for_name("SYSTEM.DATA.SQLITE"), Some(ProviderType::SqLite));
        assert_eq!(catalog.provider_for_name("mysql.data"), Some(ProviderType::MySql));
        assert_eq!(catalog.provider_for_name("Npgsql"), Some(ProviderType::PostgreSql));
        assert_eq!(catalog.provider_for_name("system.data.sqlclient"), Some(ProviderType::SqlServer));
    }

    #[test]
    fn test_provider_for_name_accepts_canonical_names() {
        let catalog = ProviderCatalog::default();

        for provider in ProviderType::all() {
            assert_eq!(catalog.provider_for_name(provider.name()), Some(provider));
        }
        assert_eq!(catalog.provider_for_name(" postgresql "), Some(ProviderType::PostgreSql));
    }

    #[test]
    fn test_provider_for_name_unknown() {
        let catalog = ProviderCatalog::default();

        assert_eq!(catalog.provider_for_name("oracle.manageddataaccess"), None);
        assert_eq!(catalog.provider_for_name(""), None);
    }

    #[test]
    fn test_with_entry_replaces_existing() {
        let catalog = ProviderCatalog::default().with_entry(
            ProviderEntry::new(ProviderType::MySql).with_candidate("MySqlConnector.MySqlConnectorFactory", "MySqlConnector"),
        );

        let candidates = catalog.candidates(ProviderType::MySql);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].type_name, "MySqlConnector.MySqlConnectorFactory");
        assert_eq!(catalog.entries.len(), 6);
        assert_eq!(catalog.provider_for_name("mysql.data"), None);
    }

    #[test]
    fn test_with_qualified_candidate() {
        let entry = ProviderEntry::new(ProviderType::MySql)
            .with_qualified_candidate("MySqlConnector.MySqlConnectorFactory, MySqlConnector")
            .unwrap();

        assert_eq!(
            entry.candidates,
            vec![DriverReference::with_origin("MySqlConnector.MySqlConnectorFactory", "MySqlConnector")]
        );

        let result = ProviderEntry::new(ProviderType::MySql).with_qualified_candidate(", MySqlConnector");
        assert!(matches!(result, Err(crate::utils::error::FactoryError::Configuration(_))));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = ProviderCatalog::empty();

        assert!(catalog.entries.is_empty());
        assert!(catalog.candidates(ProviderType::SqlServer).is_empty());
        assert_eq!(catalog.provider_for_name("SqlServer"), None);
    }

    #[test]
    fn test_loader_config_default() {
        let config = LoaderConfig::default();

        assert_eq!(config.instance_accessor, "Instance");
        assert!(config.allow_path_loading);
    }

    #[test]
    fn test_catalog_serializes_to_json() {
        let catalog = ProviderCatalog::default();
        let json = serde_json::to_string(&catalog).unwrap();
        let parsed: ProviderCatalog = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.entries.len(), catalog.entries.len());
        assert_eq!(parsed.provider_for_name("npgsql"), Some(ProviderType::PostgreSql));
    }
}
