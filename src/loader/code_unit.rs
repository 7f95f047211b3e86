use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::drivers::SharedFactory;
use crate::utils::{
    config::DEFAULT_INSTANCE_ACCESSOR,
    error::{LoadError, MemberAccessError},
};

/// A type exported by a code unit, identified by its fully-qualified name
pub trait ExportedType: Send + Sync {
    fn full_name(&self) -> &str;

    /// Read a static member expected to hold a driver factory
    fn static_member(&self, member: &str) -> Result<SharedFactory, MemberAccessError>;
}

/// A unit of code (library, package) that may be present in the process
pub trait CodeUnit: Send + Sync {
    fn name(&self) -> &str;

    /// Where the unit was loaded from, if it has a filesystem location
    fn location(&self) -> Option<&Path>;

    /// Look up a type by exact fully-qualified name
    fn find_type(&self, type_name: &str) -> Option<Arc<dyn ExportedType>>;
}

/// The host's code-loading subsystem
pub trait CodeLoader: Send + Sync {
    /// Every unit currently loaded, in load order
    fn loaded_units(&self) -> Vec<Arc<dyn CodeUnit>>;

    /// Bring a unit into the process by symbolic name
    fn load_by_name(&self, name: &str) -> Result<Arc<dyn CodeUnit>, LoadError>;

    /// Bring a unit into the process from a filesystem path
    fn load_from_path(&self, path: &Path) -> Result<Arc<dyn CodeUnit>, LoadError>;
}

type MemberGetter = Arc<dyn Fn() -> Result<SharedFactory, MemberAccessError> + Send + Sync>;

/// Exported type backed by compiled-in getters
#[derive(Clone)]
pub struct StaticType {
    full_name: String,
    members: HashMap<String, MemberGetter>,
}

impl StaticType {
    /// Type with no static members
    pub fn new(full_name: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            members: HashMap::new(),
        }
    }

    /// Type exposing `factory` under the conventional `Instance` accessor.
    /// Every read returns the same shared instance.
    pub fn singleton(full_name: &str, factory: SharedFactory) -> Self {
        Self::new(full_name).with_member(DEFAULT_INSTANCE_ACCESSOR, move || Ok(factory.clone()))
    }

    pub fn with_member<F>(mut self, member: &str, getter: F) -> Self
    where
        F: Fn() -> Result<SharedFactory, MemberAccessError> + Send + Sync + 'static,
    {
        self.members.insert(member.to_string(), Arc::new(getter));
        self
    }
}

impl fmt::Debug for StaticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticType")
            .field("full_name", &self.full_name)
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ExportedType for StaticType {
    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn static_member(&self, member: &str) -> Result<SharedFactory, MemberAccessError> {
        let getter = self.members.get(member)
            .ok_or_else(|| MemberAccessError::MemberNotFound(format!("{}.{}", self.full_name, member)))?;
        getter()
    }
}

/// Code unit whose types are registered explicitly at startup
#[derive(Debug, Clone)]
pub struct StaticUnit {
    name: String,
    location: Option<PathBuf>,
    types: HashMap<String, Arc<StaticType>>,
}

impl StaticUnit {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: None,
            types: HashMap::new(),
        }
    }

    /// Associate the unit with a file it can be loaded from
    pub fn at_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    pub fn with_type(mut self, exported: StaticType) -> Self {
        self.types.insert(exported.full_name.clone(), Arc::new(exported));
        self
    }

    /// Export `factory` as the singleton of type `type_name`
    pub fn exporting(self, type_name: &str, factory: SharedFactory) -> Self {
        self.with_type(StaticType::singleton(type_name, factory))
    }

    /// Whether `path` names this unit, by registered location or by file stem
    pub fn answers_to_path(&self, path: &Path) -> bool {
        if let Some(location) = &self.location {
            if location == path {
                return true;
            }
            if let (Ok(a), Ok(b)) = (location.canonicalize(), path.canonicalize()) {
                if a == b {
                    return true;
                }
            }
        }

        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| stem.eq_ignore_ascii_case(&self.name))
            .unwrap_or(false)
    }
}

impl CodeUnit for StaticUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    fn find_type(&self, type_name: &str) -> Option<Arc<dyn ExportedType>> {
        self.types.get(type_name).map(|t| t.clone() as Arc<dyn ExportedType>)
    }
}
