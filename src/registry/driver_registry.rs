use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::{debug, info, warn};

use crate::drivers::{SharedFactory, SqlClientFactory};
use crate::loader::{DynamicLoader, ModuleCatalog};
use crate::utils::{
    config::ProviderCatalog,
    error::{FactoryError, FactoryResult},
    types::{ProviderType, ResolutionState},
};

static GLOBAL_REGISTRY: OnceLock<Arc<DriverRegistry>> = OnceLock::new();

/// Maps providers to driver factories, loading drivers on first use.
///
/// Resolved factories are cached for the life of the registry and never
/// replaced. Failed resolutions are not cached; the next call retries.
pub struct DriverRegistry {
    catalog: ProviderCatalog,
    loader: DynamicLoader,
    cache: DashMap<ProviderType, SharedFactory>,
    builtins: RwLock<HashSet<ProviderType>>,
    states: DashMap<ProviderType, ResolutionState>,
}

impl DriverRegistry {
    /// Create a registry with no built-in drivers
    pub fn new(catalog: ProviderCatalog, loader: DynamicLoader) -> Self {
        Self {
            catalog,
            loader,
            cache: DashMap::new(),
            builtins: RwLock::new(HashSet::new()),
            states: DashMap::new(),
        }
    }

    /// Default catalog, bundled loadable drivers and the built-in SQL Server driver
    pub fn with_defaults() -> Self {
        let registry = Self::new(
            ProviderCatalog::default(),
            DynamicLoader::new(Arc::new(ModuleCatalog::bundled())),
        );
        registry.insert_builtin(ProviderType::SqlServer, Arc::new(SqlClientFactory::new()));
        registry
    }

    /// Process-wide registry built from [`DriverRegistry::with_defaults`]
    pub fn global() -> Arc<DriverRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(DriverRegistry::with_defaults()))
            .clone()
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    pub fn loader(&self) -> &DynamicLoader {
        &self.loader
    }

    /// Register a statically available driver; resolution never loads code for it.
    /// Fails with `AlreadyRegistered` once the provider has a driver.
    pub fn register_builtin(&self, provider: ProviderType, factory: SharedFactory) -> FactoryResult<()> {
        self.register(provider, factory)?;
        self.builtins_write().insert(provider);
        Ok(())
    }

    // Only for registries under construction, where the cache is still empty.
    fn insert_builtin(&self, provider: ProviderType, factory: SharedFactory) {
        self.cache.insert(provider, factory);
        self.states.insert(provider, ResolutionState::Resolved);
        self.builtins_write().insert(provider);
    }

    /// Explicitly register a driver for a provider that has not been resolved yet
    pub fn register(&self, provider: ProviderType, factory: SharedFactory) -> FactoryResult<()> {
        match self.cache.entry(provider) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(FactoryError::AlreadyRegistered(provider)),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(factory);
                self.states.insert(provider, ResolutionState::Resolved);
                Ok(())
            }
        }
    }

    pub fn is_builtin(&self, provider: ProviderType) -> bool {
        self.builtins_read().contains(&provider)
    }

    pub fn state(&self, provider: ProviderType) -> ResolutionState {
        if self.cache.contains_key(&provider) {
            return ResolutionState::Resolved;
        }
        self.states
            .get(&provider)
            .map(|s| *s)
            .unwrap_or(ResolutionState::Unresolved)
    }

    /// Cached factory, without attempting resolution
    pub fn cached(&self, provider: ProviderType) -> Option<SharedFactory> {
        self.cache.get(&provider).map(|f| f.value().clone())
    }

    /// Map a provider name or alias to its provider
    pub fn provider_for_name(&self, name: &str) -> FactoryResult<ProviderType> {
        self.catalog
            .provider_for_name(name)
            .ok_or_else(|| FactoryError::UnsupportedProvider { name: name.to_string() })
    }

    /// Resolve a provider name or alias; unknown names fail before any state changes
    pub fn resolve_name(&self, name: &str) -> FactoryResult<(ProviderType, SharedFactory)> {
        let provider = self.provider_for_name(name)?;
        let factory = self.resolve(provider)?;
        Ok((provider, factory))
    }

    /// Resolve a provider to its driver factory.
    ///
    /// Candidates are tried in catalog order and the first that
    /// materializes is cached. Concurrent first resolutions may each
    /// materialize, but all of them return whichever factory reached the
    /// cache first.
    pub fn resolve(&self, provider: ProviderType) -> FactoryResult<SharedFactory> {
        if let Some(factory) = self.cached(provider) {
            return Ok(factory);
        }

        self.states.insert(provider, ResolutionState::Resolving);

        let mut attempted = Vec::new();
        for candidate in self.catalog.candidates(provider) {
            match self.loader.materialize(candidate) {
                Ok(factory) => {
                    let factory = self.cache.entry(provider).or_insert(factory).value().clone();
                    self.states.insert(provider, ResolutionState::Resolved);
                    info!(%provider, driver = factory.name(), "provider resolved");
                    return Ok(factory);
                }
                Err(e) => {
                    debug!(%provider, candidate = %candidate, error = %e, "candidate failed");
                    attempted.push(candidate.clone());
                }
            }
        }

        // Another caller may have won the race while our candidates failed.
        if let Some(factory) = self.cached(provider) {
            self.states.insert(provider, ResolutionState::Resolved);
            return Ok(factory);
        }

        self.states.insert(provider, ResolutionState::Unavailable);
        warn!(%provider, attempted = attempted.len(), "provider unavailable");
        Err(FactoryError::ProviderUnavailable { provider, attempted })
    }

    fn builtins_read(&self) -> std::sync::RwLockReadGuard<'_, HashSet<ProviderType>> {
        self.builtins.read().unwrap_or_else(|e| e.into_inner())
    }

    fn builtins_write(&self) -> std::sync::RwLockWriteGuard<'_, HashSet<ProviderType>> {
        self.builtins.write().unwrap_or_else(|e| e.into_inner())
    }
}
