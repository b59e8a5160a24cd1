//! schemata - typed property schemas with constraint-aware validation
//!
//! Types validate single values and report failures as `Outcome` values.
//! Models group types into property maps and build records from JSON
//! attribute sets.

pub mod equality;
pub mod outcome;
pub mod schema;
pub mod util;

pub use equality::{Comparable, Comparison, Deconstruct, Equality};
pub use outcome::{Outcome, OutcomeClass};
pub use schema::{
    Error, FieldValue, Kind, Model, ModelBuilder, Record, RegistryConfig, SchemaResult, Type,
    TypeClass, TypeOptions, TypeRegistry,
};
pub use util::{normalize_integer_range, IntRange};
