//! Schema subsystem
//!
//! Models are declared property by property against a `TypeRegistry`, then
//! frozen. Records are validated against a frozen model when they are built.
//!
//! # Design Principles
//!
//! - Constraint definitions are checked at declaration
//! - Unknown attributes are rejected before any property is read
//! - Parse failures travel as `Outcome` values until unwrapped
//! - Declared types and frozen models are never modified

mod config;
mod errors;
mod methods;
mod model;
mod record;
mod registry;
mod types;

pub use config::{RegistryConfig, UnknownKindPolicy};
pub use errors::{
    ConfigError, Error, ErrorCategory, InvalidRecord, Raise, SchemaError, SchemaResult,
    ValidationError,
};
pub use methods::{Accessor, Method, Methods};
pub use model::{Model, ModelBuilder, ModelId};
pub use record::{FieldValue, Record};
pub use registry::TypeRegistry;
pub use types::{value_kind, CustomType, Kind, ParseFn, Type, TypeClass, TypeOptions};
