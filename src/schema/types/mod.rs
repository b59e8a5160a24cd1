//! Type descriptors
//!
//! A `Type` is the validation rule for one property: its name, whether it is
//! required, its default, an optional inclusion list and the constraint of
//! its class:
//!
//! - Object: any value, or a nested model when a schema is given
//! - Boolean: `true` or `false`
//! - Integer: an integer within an inclusive range
//! - String: a string whose length is within an inclusive range
//! - Custom: a caller supplied parser, run after the inclusion check
//!
//! Constraint definitions are checked when the type is built; a type that
//! was built is never modified again.

mod boolean;
mod integer;
mod object;
mod string;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Bound, RangeBounds};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::errors::{ConfigError, SchemaError, SchemaResult, ValidationError};
use super::methods::{Method, Methods};
use super::model::Model;
use super::record::{FieldValue, Record};
use crate::equality::{hash_value, options_eq, values_eq, Comparison, Deconstruct, Equality};
use crate::outcome::Outcome;
use crate::util::IntRange;

/// Native value kinds a type class can be registered for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Boolean,
    Integer,
    String,
    Object,
    /// A caller defined kind
    Named(String),
}

impl Kind {
    pub fn named(name: impl Into<String>) -> Self {
        Kind::Named(name.into())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Boolean => write!(f, "Boolean"),
            Kind::Integer => write!(f, "Integer"),
            Kind::String => write!(f, "String"),
            Kind::Object => write!(f, "Object"),
            Kind::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Parser of a custom type class
pub type ParseFn = fn(&Value) -> Outcome<Value>;

/// A caller defined type class
#[derive(Debug, Clone, Copy)]
pub struct CustomType {
    name: &'static str,
    parse: ParseFn,
}

impl CustomType {
    pub const fn new(name: &'static str, parse: ParseFn) -> Self {
        Self { name, parse }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parse(&self, value: &Value) -> Outcome<Value> {
        (self.parse)(value)
    }
}

// Custom classes are identified by name
impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CustomType {}

impl Hash for CustomType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// The class of a type descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Object,
    Boolean,
    Integer,
    String,
    Custom(CustomType),
}

impl TypeClass {
    /// Returns the class name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            TypeClass::Object => "Object",
            TypeClass::Boolean => "Boolean",
            TypeClass::Integer => "Integer",
            TypeClass::String => "String",
            TypeClass::Custom(custom) => custom.name(),
        }
    }

    /// The kind this class handles when declared as a default
    pub fn native_kind(&self) -> Kind {
        match self {
            TypeClass::Object => Kind::Object,
            TypeClass::Boolean => Kind::Boolean,
            TypeClass::Integer => Kind::Integer,
            TypeClass::String => Kind::String,
            TypeClass::Custom(custom) => Kind::named(custom.name()),
        }
    }

    pub fn superclass(&self) -> Option<TypeClass> {
        match self {
            TypeClass::Boolean => Some(TypeClass::Object),
            _ => None,
        }
    }

    /// True when `self` is `other` or one of its subclasses
    pub fn is_a(&self, other: &TypeClass) -> bool {
        self == other || self.superclass().is_some_and(|parent| parent.is_a(other))
    }

    /// Builds a type of this class, checking the constraint definitions
    pub fn build(self, name: impl Into<String>, options: TypeOptions) -> Result<Type, ConfigError> {
        let name = name.into();
        match self {
            TypeClass::Object => object::build(name, options),
            TypeClass::Boolean => boolean::build(name, options),
            TypeClass::Integer => integer::build(name, options),
            TypeClass::String => string::build(name, options),
            TypeClass::Custom(custom) => {
                options.check_supported(custom.name(), &["includes"])?;
                Ok(Type::assemble(self, name, options, Constraint::None))
            }
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Options accepted when declaring a property
#[derive(Debug, Clone)]
pub struct TypeOptions {
    required: bool,
    default: Option<Value>,
    includes: Option<Vec<Value>>,
    range: Option<(Bound<i64>, Bound<i64>)>,
    length: Option<(Bound<i64>, Bound<i64>)>,
    schema: Option<Arc<Model>>,
}

impl Default for TypeOptions {
    fn default() -> Self {
        Self {
            required: true,
            default: None,
            includes: None,
            range: None,
            length: None,
            schema: None,
        }
    }
}

impl TypeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn optional(self) -> Self {
        self.required(false)
    }

    /// Value used when the attribute is absent
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restricts values to the given enumeration
    pub fn includes<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.includes = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Integer range; normalized when the type is built
    pub fn range<R: RangeBounds<i64>>(mut self, range: R) -> Self {
        self.range = Some((range.start_bound().cloned(), range.end_bound().cloned()));
        self
    }

    /// String length range; normalized when the type is built
    pub fn length<R: RangeBounds<i64>>(mut self, range: R) -> Self {
        self.length = Some((range.start_bound().cloned(), range.end_bound().cloned()));
        self
    }

    /// Nested model for Object types
    pub fn schema(mut self, model: Arc<Model>) -> Self {
        self.schema = Some(model);
        self
    }

    pub(crate) fn range_bounds(&self) -> Option<&(Bound<i64>, Bound<i64>)> {
        self.range.as_ref()
    }

    pub(crate) fn length_bounds(&self) -> Option<&(Bound<i64>, Bound<i64>)> {
        self.length.as_ref()
    }

    pub(crate) fn nested_schema(&self) -> Option<&Arc<Model>> {
        self.schema.as_ref()
    }

    /// Rejects constraint options the class does not understand
    pub(crate) fn check_supported(
        &self,
        class: &'static str,
        supported: &[&'static str],
    ) -> Result<(), ConfigError> {
        let set = [
            ("includes", self.includes.is_some()),
            ("range", self.range.is_some()),
            ("length", self.length.is_some()),
            ("schema", self.schema.is_some()),
        ];

        match set
            .iter()
            .find(|(option, is_set)| *is_set && !supported.contains(option))
        {
            Some((option, _)) => Err(ConfigError::unsupported(*option, class)),
            None => Ok(()),
        }
    }
}

/// Class specific constraint of a type
#[derive(Debug, Clone)]
pub(crate) enum Constraint {
    None,
    Range(IntRange),
    Length(IntRange),
    Schema(Arc<Model>),
}

impl Constraint {
    fn same_as(&self, other: &Constraint) -> bool {
        match (self, other) {
            (Constraint::None, Constraint::None) => true,
            (Constraint::Range(a), Constraint::Range(b)) => a == b,
            (Constraint::Length(a), Constraint::Length(b)) => a == b,
            (Constraint::Schema(a), Constraint::Schema(b)) => a.id() == b.id(),
            _ => false,
        }
    }

    fn hash_into<H: Hasher>(&self, state: &mut H) {
        match self {
            Constraint::None => 0u8.hash(state),
            Constraint::Range(range) => {
                1u8.hash(state);
                range.hash(state);
            }
            Constraint::Length(length) => {
                2u8.hash(state);
                length.hash(state);
            }
            Constraint::Schema(model) => {
                3u8.hash(state);
                model.id().hash(state);
            }
        }
    }
}

/// Validation rule for one property
#[derive(Debug, Clone)]
pub struct Type {
    class: TypeClass,
    name: String,
    slot: usize,
    required: bool,
    default: Option<Value>,
    includes: Option<Vec<Value>>,
    constraint: Constraint,
    finalized: bool,
}

impl Type {
    /// Builds a type of `class`; shorthand for `TypeClass::build`
    pub fn new(
        class: TypeClass,
        name: impl Into<String>,
        options: TypeOptions,
    ) -> Result<Self, ConfigError> {
        class.build(name, options)
    }

    /// An unconstrained Object type
    pub fn object(name: impl Into<String>) -> Self {
        object::assemble(name.into(), TypeOptions::new())
    }

    /// A Boolean type
    pub fn boolean(name: impl Into<String>) -> Self {
        boolean::assemble(name.into(), TypeOptions::new())
    }

    pub fn integer(name: impl Into<String>, options: TypeOptions) -> Result<Self, ConfigError> {
        integer::build(name.into(), options)
    }

    pub fn string(name: impl Into<String>, options: TypeOptions) -> Result<Self, ConfigError> {
        string::build(name.into(), options)
    }

    fn assemble(class: TypeClass, name: String, options: TypeOptions, constraint: Constraint) -> Self {
        Self {
            class,
            name,
            slot: 0,
            required: options.required,
            default: options.default,
            includes: options.includes,
            constraint,
            finalized: false,
        }
    }

    pub(crate) fn with_slot(mut self, slot: usize) -> Self {
        self.slot = slot;
        self
    }

    pub fn class(&self) -> TypeClass {
        self.class
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the record field this type reads and writes
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn includes(&self) -> Option<&[Value]> {
        self.includes.as_deref()
    }

    /// Integer range, for Integer types
    pub fn range(&self) -> Option<IntRange> {
        match self.constraint {
            Constraint::Range(range) => Some(range),
            _ => None,
        }
    }

    pub fn min_range(&self) -> Option<i64> {
        self.range().and_then(|range| range.min())
    }

    pub fn max_range(&self) -> Option<i64> {
        self.range().and_then(|range| range.max())
    }

    /// Length range, for String types
    pub fn length(&self) -> Option<IntRange> {
        match self.constraint {
            Constraint::Length(length) => Some(length),
            _ => None,
        }
    }

    pub fn min_length(&self) -> Option<i64> {
        self.length().and_then(|length| length.min())
    }

    pub fn max_length(&self) -> Option<i64> {
        self.length().and_then(|length| length.max())
    }

    /// Nested model, for Object types declared with a schema
    pub fn schema(&self) -> Option<&Arc<Model>> {
        match &self.constraint {
            Constraint::Schema(model) => Some(model),
            _ => None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Populates this property's field of `record` from `attributes`.
    ///
    /// The supplied value, or the default when it is absent, goes through
    /// `parse`; a failure is raised as a `ValidationError`. A required
    /// property with neither raises `SchemaError::MissingRequired`.
    pub fn init(&self, record: &mut Record, attributes: &Map<String, Value>) -> SchemaResult<&Self> {
        let null_is_absent = record.model().registry().config().null_is_absent;
        let supplied = attributes
            .get(&self.name)
            .filter(|value| !(null_is_absent && value.is_null()));

        match supplied.or(self.default.as_ref()) {
            Some(value) => {
                let field = self
                    .parse(value)
                    .map_failure(|message| ValidationError::new(&self.name, message))
                    .unwrap()?;
                Ok(self.set(record, field))
            }
            None if self.required => Err(SchemaError::missing_required(&self.name).into()),
            None => Ok(self.set(record, FieldValue::NULL)),
        }
    }

    pub fn get<'r>(&self, record: &'r Record) -> &'r FieldValue {
        record.slot(self.slot)
    }

    pub fn set(&self, record: &mut Record, value: FieldValue) -> &Self {
        record.put(self.slot, value);
        self
    }

    /// Validates and coerces a value
    pub fn parse(&self, value: &Value) -> Outcome<FieldValue> {
        self.check_includes(value)
            .and_then(|value| match &self.constraint {
                Constraint::Range(range) => integer::parse(range, value),
                Constraint::Length(length) => string::parse(length, value),
                Constraint::Schema(model) => object::parse(model, value),
                Constraint::None => match self.class {
                    TypeClass::Custom(custom) => custom.parse(value).map(FieldValue::Value),
                    _ => Outcome::success(FieldValue::Value(value.clone())),
                },
            })
    }

    fn check_includes<'v>(&self, value: &'v Value) -> Outcome<&'v Value> {
        match &self.includes {
            Some(includes)
                if !includes
                    .iter()
                    .any(|member| values_eq(member, value, Comparison::Coercing)) =>
            {
                Outcome::failure(format!(
                    "must be one of {}, but was {}",
                    display_list(includes),
                    display_value(value)
                ))
            }
            _ => Outcome::success(value),
        }
    }

    /// Registers the accessors of this property
    pub fn add_methods(&self, methods: &mut Methods) -> &Self {
        methods.define(self.name.clone(), Method::reader(self.slot));
        if self.class == TypeClass::Boolean {
            boolean::add_methods(self, methods);
        }
        self
    }

    /// Marks the type as final; idempotent
    pub fn finalize(mut self) -> Self {
        self.finalized = true;
        self
    }
}

impl Equality for Type {
    type Class = TypeClass;

    fn class(&self) -> TypeClass {
        self.class
    }

    fn is_a(&self, class: &TypeClass) -> bool {
        self.class.is_a(class)
    }

    fn state_eq(&self, other: &Self, comparison: Comparison) -> bool {
        self.name == other.name
            && self.required == other.required
            && options_eq(self.default.as_ref(), other.default.as_ref(), comparison)
            && options_eq(
                includes_value(&self.includes).as_ref(),
                includes_value(&other.includes).as_ref(),
                comparison,
            )
            && self.constraint.same_as(&other.constraint)
    }

    fn hash_state<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.required.hash(state);
        hash_value(self.default.as_ref().unwrap_or(&Value::Null), state);
        hash_value(&includes_value(&self.includes).unwrap_or(Value::Null), state);
        self.constraint.hash_into(state);
    }
}

impl Deconstruct for Type {
    fn object_state(&self) -> Map<String, Value> {
        let mut state = Map::new();
        state.insert("name".into(), json!(self.name));
        state.insert("required".into(), json!(self.required));
        state.insert("default".into(), self.default.clone().unwrap_or(Value::Null));
        state.insert(
            "includes".into(),
            includes_value(&self.includes).unwrap_or(Value::Null),
        );
        match &self.constraint {
            Constraint::None => {}
            Constraint::Range(range) => {
                state.insert("range".into(), range.to_value());
            }
            Constraint::Length(length) => {
                state.insert("length".into(), length.to_value());
            }
            Constraint::Schema(model) => {
                state.insert("schema".into(), json!(model.name()));
            }
        }
        state
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.eql(other)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

fn includes_value(includes: &Option<Vec<Value>>) -> Option<Value> {
    includes.as_ref().map(|values| Value::Array(values.clone()))
}

/// Renders a value for messages; strings appear without quotes
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn display_list(values: &[Value]) -> String {
    let items: Vec<String> = values.iter().map(display_value).collect();
    format!("[{}]", items.join(", "))
}

/// Name of a JSON value's kind, for messages
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(n) if n.is_f64() => "Float",
        Value::Number(_) => "Integer",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}
