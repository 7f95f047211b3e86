use dashmap::DashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::drivers::{NpgsqlFactory, NPGSQL_FACTORY_NAME, NPGSQL_ORIGIN};
use crate::loader::code_unit::{CodeLoader, CodeUnit, StaticUnit};
use crate::utils::error::LoadError;

/// In-process code loader over units registered at startup.
///
/// Registered units are *available*: they only become visible to type
/// searches once loaded, by name or by path. Preloaded units are visible
/// from the start.
#[derive(Debug, Default)]
pub struct ModuleCatalog {
    available: DashMap<String, Arc<StaticUnit>>,
    loaded: RwLock<Vec<Arc<StaticUnit>>>,
    origin_loads: AtomicUsize,
}

impl ModuleCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the drivers shipped in this crate available for loading
    pub fn bundled() -> Self {
        let catalog = Self::new();
        catalog.register(
            StaticUnit::new(NPGSQL_ORIGIN).exporting(NPGSQL_FACTORY_NAME, Arc::new(NpgsqlFactory)),
        );
        catalog
    }

    /// Make a unit available for loading
    pub fn register(&self, unit: StaticUnit) {
        debug!(unit = unit.name(), "code unit available");
        self.available.insert(unit.name().to_ascii_lowercase(), Arc::new(unit));
    }

    /// Add a unit that is already loaded
    pub fn preload(&self, unit: StaticUnit) {
        let unit = Arc::new(unit);
        self.available.insert(unit.name().to_ascii_lowercase(), unit.clone());
        self.loaded_write().push(unit);
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.find_loaded(name).is_some()
    }

    /// Number of units brought in through `load_by_name` / `load_from_path`
    pub fn origin_loads(&self) -> usize {
        self.origin_loads.load(Ordering::SeqCst)
    }

    fn find_loaded(&self, name: &str) -> Option<Arc<StaticUnit>> {
        self.loaded_read()
            .iter()
            .find(|unit| unit.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    fn load_unit(&self, unit: Arc<StaticUnit>) -> Arc<dyn CodeUnit> {
        let mut loaded = self.loaded_write();
        if let Some(existing) = loaded.iter().find(|u| u.name().eq_ignore_ascii_case(unit.name())) {
            return existing.clone();
        }

        debug!(unit = unit.name(), "code unit loaded");
        self.origin_loads.fetch_add(1, Ordering::SeqCst);
        loaded.push(unit.clone());
        unit
    }

    // A poisoned lock only means a panic happened mid-push; the list itself stays valid.
    fn loaded_read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<StaticUnit>>> {
        self.loaded.read().unwrap_or_else(|e| e.into_inner())
    }

    fn loaded_write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<StaticUnit>>> {
        self.loaded.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl CodeLoader for ModuleCatalog {
    fn loaded_units(&self) -> Vec<Arc<dyn CodeUnit>> {
        self.loaded_read()
            .iter()
            .map(|unit| unit.clone() as Arc<dyn CodeUnit>)
            .collect()
    }

    fn load_by_name(&self, name: &str) -> Result<Arc<dyn CodeUnit>, LoadError> {
        if let Some(unit) = self.find_loaded(name) {
            return Ok(unit as Arc<dyn CodeUnit>);
        }

        let unit = self.available
            .get(&name.to_ascii_lowercase())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LoadError::OriginNotFound(name.to_string()))?;

        Ok(self.load_unit(unit))
    }

    fn load_from_path(&self, path: &Path) -> Result<Arc<dyn CodeUnit>, LoadError> {
        if !path.exists() {
            return Err(LoadError::PathNotFound(path.to_path_buf()));
        }

        let unit = self.available
            .iter()
            .find(|entry| entry.value().answers_to_path(path))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LoadError::PathNotRecognized(path.to_path_buf()))?;

        Ok(self.load_unit(unit))
    }
}
