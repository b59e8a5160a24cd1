//! # Type Registry
//!
//! Maps native kinds to the type class that validates them. A registry is
//! an explicit handle: models declared through it share its map, and
//! `share()` hands the same map to another declaration context.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use super::config::{RegistryConfig, UnknownKindPolicy};
use super::errors::{ConfigError, Error, SchemaResult};
use super::types::{Kind, TypeClass};

/// Registry of type classes by native kind
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    /// Type classes by kind, shared between handles
    classes: Arc<RwLock<HashMap<Kind, TypeClass>>>,

    config: RegistryConfig,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            classes: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Create a registry with the built-in kinds declared
    pub fn with_defaults(config: RegistryConfig) -> Self {
        let classes = [
            TypeClass::Object,
            TypeClass::Boolean,
            TypeClass::Integer,
            TypeClass::String,
        ]
        .into_iter()
        .map(|class| (class.native_kind(), class))
        .collect();

        Self {
            classes: Arc::new(RwLock::new(classes)),
            config,
        }
    }

    /// Map `kind` to `class`; returns the class
    pub fn register(&self, kind: Kind, class: TypeClass) -> SchemaResult<TypeClass> {
        let mut classes = self
            .classes
            .write()
            .map_err(|_| Error::internal("Lock poisoned"))?;

        debug!(kind = %kind, class = %class, "registering type class");
        classes.insert(kind, class);
        Ok(class)
    }

    /// Remove the mapping for `kind`, returning the class it had
    pub fn unregister(&self, kind: &Kind) -> SchemaResult<Option<TypeClass>> {
        let mut classes = self
            .classes
            .write()
            .map_err(|_| Error::internal("Lock poisoned"))?;
        Ok(classes.remove(kind))
    }

    /// Declare `class` as the handler of its own native kind
    pub fn declare_default_kind(&self, class: TypeClass) -> SchemaResult<TypeClass> {
        self.register(class.native_kind(), class)
    }

    /// Resolve the class for `kind`, following the unknown kind policy
    pub fn lookup(&self, kind: &Kind) -> SchemaResult<TypeClass> {
        let found = {
            let classes = self
                .classes
                .read()
                .map_err(|_| Error::internal("Lock poisoned"))?;
            classes.get(kind).copied()
        };

        match (found, self.config.unknown_kind) {
            (Some(class), _) => Ok(class),
            (None, UnknownKindPolicy::Reject) => Err(ConfigError::UnknownKind(kind.clone()).into()),
            (None, UnknownKindPolicy::FallbackToObject) => {
                warn!(kind = %kind, "no type class registered, using Object");
                Ok(TypeClass::Object)
            }
        }
    }

    /// Registered kinds, in no particular order
    pub fn kinds(&self) -> SchemaResult<Vec<Kind>> {
        let classes = self
            .classes
            .read()
            .map_err(|_| Error::internal("Lock poisoned"))?;
        Ok(classes.keys().cloned().collect())
    }

    /// Another handle on the same map
    pub fn share(&self) -> Self {
        self.clone()
    }

    /// True when both handles point at the same map
    pub fn shares_with(&self, other: &TypeRegistry) -> bool {
        Arc::ptr_eq(&self.classes, &other.classes)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_defaults(RegistryConfig::default())
    }
}
