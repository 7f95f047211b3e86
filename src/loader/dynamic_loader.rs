use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::drivers::SharedFactory;
use crate::loader::code_unit::{CodeLoader, ExportedType};
use crate::utils::{
    config::LoaderConfig,
    error::{FactoryError, FactoryResult},
    types::DriverReference,
};

/// Turns symbolic driver references into factory instances.
///
/// Lookup order for a reference:
/// 1. search every loaded code unit for the type
/// 2. if absent and the reference names an origin, load the origin (by
///    name, then as a filesystem path) and search again
/// 3. read the type's singleton accessor
///
/// Any failure along the way, including a faulting accessor, ends as a
/// single `DriverLoad` error carrying the reference.
pub struct DynamicLoader {
    code_loader: Arc<dyn CodeLoader>,
    config: LoaderConfig,
    attempts: AtomicUsize,
}

impl DynamicLoader {
    pub fn new(code_loader: Arc<dyn CodeLoader>) -> Self {
        Self::with_config(code_loader, LoaderConfig::default())
    }

    pub fn with_config(code_loader: Arc<dyn CodeLoader>, config: LoaderConfig) -> Self {
        Self {
            code_loader,
            config,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn code_loader(&self) -> &Arc<dyn CodeLoader> {
        &self.code_loader
    }

    /// Number of `materialize` calls made so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Resolve `reference` to its singleton factory
    pub fn materialize(&self, reference: &DriverReference) -> FactoryResult<SharedFactory> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(factory) = self.from_loaded(reference) {
            return Ok(factory);
        }

        if let Some(origin) = reference.origin_hint() {
            if self.load_origin(origin) {
                if let Some(factory) = self.from_loaded(reference) {
                    return Ok(factory);
                }
            }
        }

        Err(FactoryError::DriverLoad { reference: reference.clone() })
    }

    /// First loaded unit, in load order, that defines `type_name`
    pub fn find_type(&self, type_name: &str) -> Option<Arc<dyn ExportedType>> {
        self.code_loader
            .loaded_units()
            .iter()
            .find_map(|unit| unit.find_type(type_name))
    }

    fn from_loaded(&self, reference: &DriverReference) -> Option<SharedFactory> {
        let exported = self.find_type(&reference.type_name)?;

        match exported.static_member(&self.config.instance_accessor) {
            Ok(factory) => Some(factory),
            Err(e) => {
                debug!(reference = %reference, error = %e, "singleton accessor unusable");
                None
            }
        }
    }

    fn load_origin(&self, origin: &str) -> bool {
        let by_name = match self.code_loader.load_by_name(origin) {
            Ok(unit) => {
                debug!(origin, unit = unit.name(), "origin loaded by name");
                return true;
            }
            Err(e) => e,
        };

        let path = Path::new(origin);
        if !self.config.allow_path_loading || !path.exists() {
            debug!(origin, error = %by_name, "origin not loadable");
            return false;
        }

        match self.code_loader.load_from_path(path) {
            Ok(unit) => {
                debug!(origin, unit = unit.name(), "origin loaded from path");
                true
            }
            Err(e) => {
                debug!(origin, error = %e, "origin path not loadable");
                false
            }
        }
    }
}
