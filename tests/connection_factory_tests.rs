use std::sync::Arc;

use connector_factory::drivers::MockDriverFactory;
use connector_factory::factory::ConnectionFactory;
use connector_factory::loader::{DynamicLoader, ModuleCatalog, StaticUnit};
use connector_factory::registry::DriverRegistry;
use connector_factory::utils::{
    config::ProviderCatalog,
    error::{ConnectionError, FactoryError},
    types::{ConnectionState, ProviderType},
};

fn sqlite_modules() -> ModuleCatalog {
    let modules = ModuleCatalog::new();
    modules.register(StaticUnit::new("Microsoft.Data.Sqlite").exporting(
        "Microsoft.Data.Sqlite.SqliteFactory",
        Arc::new(MockDriverFactory::new("Microsoft.Data.Sqlite.SqliteFactory")),
    ));
    modules
}

fn factory_over(modules: ModuleCatalog) -> ConnectionFactory {
    let registry = DriverRegistry::new(ProviderCatalog::default(), DynamicLoader::new(Arc::new(modules)));
    ConnectionFactory::new(Arc::new(registry))
}

#[test]
fn test_microsoft_sqlite_alias_scenario() {
    let factory = factory_over(sqlite_modules());

    let handle = factory.create_by_name("microsoft.data.sqlite", "Data Source=test.db").unwrap();

    assert_eq!(handle.connection_string(), "Data Source=test.db");
    assert_eq!(handle.provider(), ProviderType::SqLite);
    assert_eq!(handle.state(), ConnectionState::Closed);
}

#[test]
fn test_repeated_create_shares_driver_instance() {
    let factory = factory_over(sqlite_modules());

    let first = factory.create(ProviderType::SqLite, "Data Source=a.db").unwrap();
    let second = factory.create(ProviderType::SqLite, "Data Source=b.db").unwrap();

    assert!(Arc::ptr_eq(first.driver(), second.driver()));
    assert_eq!(first.connection_string(), "Data Source=a.db");
    assert_eq!(second.connection_string(), "Data Source=b.db");
    assert_eq!(factory.registry().loader().attempts(), 1);
}

#[test]
fn test_factories_sharing_a_registry_share_drivers() {
    let registry = Arc::new(DriverRegistry::new(
        ProviderCatalog::default(),
        DynamicLoader::new(Arc::new(sqlite_modules())),
    ));
    let a = ConnectionFactory::new(registry.clone());
    let b = ConnectionFactory::new(registry);

    let from_a = a.create(ProviderType::SqLite, "Data Source=a.db").unwrap();
    let from_b = b.create_by_name("sqlite", "Data Source=b.db").unwrap();

    assert!(Arc::ptr_eq(from_a.driver(), from_b.driver()));
}

#[test]
fn test_missing_connection_string_never_resolves() {
    let factory = factory_over(sqlite_modules());

    for provider in ProviderType::all() {
        let result = factory.create(provider, "");
        assert!(matches!(result, Err(FactoryError::MissingConnectionString)));
    }
    assert!(matches!(
        factory.create_by_name("microsoft.data.sqlite", ""),
        Err(FactoryError::MissingConnectionString)
    ));

    assert_eq!(factory.registry().loader().attempts(), 0);
    assert!(factory.registry().cached(ProviderType::SqLite).is_none());
}

#[test]
fn test_connection_string_passed_through_unmodified() {
    let factory = factory_over(sqlite_modules());
    let raw = "  Data Source=C:\\data\\app.db;Mode=ReadWriteCreate;Cache=Shared;  ";

    let handle = factory.create(ProviderType::SqLite, raw).unwrap();
    assert_eq!(handle.connection_string(), raw);
}

#[test]
fn test_unavailable_provider_propagates_unchanged() {
    let factory = factory_over(ModuleCatalog::new());

    match factory.create(ProviderType::PostgreSql, "host=localhost") {
        Err(FactoryError::ProviderUnavailable { provider, attempted }) => {
            assert_eq!(provider, ProviderType::PostgreSql);
            assert_eq!(attempted.len(), 1);
            assert_eq!(attempted[0].origin_hint(), Some("Npgsql"));
        }
        other => panic!("Expected ProviderUnavailable, got {:?}", other),
    }
}

#[test]
fn test_unsupported_provider_name() {
    let factory = factory_over(sqlite_modules());

    match factory.create_by_name("firebird", "Database=app.fdb") {
        Err(FactoryError::UnsupportedProvider { name }) => assert_eq!(name, "firebird"),
        other => panic!("Expected UnsupportedProvider, got {:?}", other),
    }
}

#[test]
fn test_default_registry_resolves_builtin_sql_server() {
    let factory = ConnectionFactory::new(Arc::new(DriverRegistry::with_defaults()));

    let handle = factory
        .create(ProviderType::SqlServer, "Server=tcp:localhost,1433;Database=master;User Id=sa;Password=secret")
        .unwrap();

    assert_eq!(handle.provider(), ProviderType::SqlServer);
    assert_eq!(handle.driver().name(), "System.Data.SqlClient.SqlClientFactory");
    assert_eq!(handle.state(), ConnectionState::Closed);
    assert_eq!(factory.registry().loader().attempts(), 0);
}

#[test]
fn test_default_registry_loads_bundled_postgres_driver() {
    let factory = ConnectionFactory::new(Arc::new(DriverRegistry::with_defaults()));

    let handle = factory.create_by_name("npgsql", "host=localhost user=postgres").unwrap();

    assert_eq!(handle.provider(), ProviderType::PostgreSql);
    assert_eq!(handle.driver().name(), "Npgsql.NpgsqlFactory");
    assert_eq!(handle.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_open_failure_surfaces_driver_error() {
    let modules = ModuleCatalog::new();
    modules.register(StaticUnit::new("MySql.Data").exporting(
        "MySql.Data.MySqlClient.MySqlClientFactory",
        Arc::new(MockDriverFactory::new("MySql.Data.MySqlClient.MySqlClientFactory").failing_open()),
    ));
    let factory = factory_over(modules);

    let mut handle = factory.create(ProviderType::MySql, "Server=localhost;Database=app").unwrap();
    let result = handle.open().await;

    assert!(matches!(result, Err(FactoryError::Connection(ConnectionError::ConnectionFailed(_)))));
    assert_eq!(handle.state(), ConnectionState::Closed);
}

#[test]
fn test_bound_factory_mirrors_create() {
    let factory = factory_over(sqlite_modules());
    let bound = factory.bind(ProviderType::SqLite, Some("Data Source=bound.db".to_string()));

    let handle = bound.create_connection().unwrap();
    let direct = factory.create(ProviderType::SqLite, "Data Source=direct.db").unwrap();

    assert!(Arc::ptr_eq(handle.driver(), direct.driver()));
    assert_eq!(handle.connection_string(), "Data Source=bound.db");
}

#[test]
fn test_closing_unopened_handle_is_noop() {
    let factory = factory_over(sqlite_modules());
    let mut handle = factory.create(ProviderType::SqLite, "Data Source=test.db").unwrap();

    tokio_test::block_on(handle.close()).unwrap();
    assert_eq!(handle.state(), ConnectionState::Closed);
}
