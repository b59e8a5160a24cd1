//! Models: named property maps
//!
//! A model is declared through a `ModelBuilder` and frozen into an
//! `Arc<Model>` that records are built against. Declaration order fixes the
//! slot of each property. Subclasses start from an independent copy of the
//! parent's properties and remember the parent's id for `is_a`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::errors::{Error, InvalidRecord, SchemaError, SchemaResult};
use super::methods::{Method, Methods};
use super::record::Record;
use super::registry::TypeRegistry;
use super::types::{value_kind, Kind, Type, TypeOptions};

/// Identity of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModelId(Uuid);

impl ModelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declaration phase of a model
#[derive(Debug)]
pub struct ModelBuilder {
    id: ModelId,
    name: String,
    ancestors: Vec<ModelId>,
    registry: TypeRegistry,
    properties: Vec<Type>,
}

impl ModelBuilder {
    /// Start a model whose kinds resolve through `registry`
    pub fn new(name: impl Into<String>, registry: &TypeRegistry) -> Self {
        Self {
            id: ModelId::new(),
            name: name.into(),
            ancestors: Vec::new(),
            registry: registry.share(),
            properties: Vec::new(),
        }
    }

    /// Declare a property. Redeclaring a name replaces the type in place.
    pub fn prop(mut self, name: impl Into<String>, kind: Kind, options: TypeOptions) -> SchemaResult<Self> {
        let class = self.registry.lookup(&kind)?;
        let name = name.into();
        let slot = self
            .properties
            .iter()
            .position(|property| property.name() == name)
            .unwrap_or(self.properties.len());

        let ty = class.build(name, options)?.with_slot(slot);
        debug!(model = %self.name, property = ty.name(), class = %class, slot, "declaring property");

        if slot == self.properties.len() {
            self.properties.push(ty);
        } else {
            self.properties[slot] = ty;
        }
        Ok(self)
    }

    /// Declare an Object property whose schema is built by `build`
    pub fn prop_object<F>(self, name: impl Into<String>, options: TypeOptions, build: F) -> SchemaResult<Self>
    where
        F: FnOnce(ModelBuilder) -> SchemaResult<ModelBuilder>,
    {
        let name = name.into();
        let schema = build(self.nested(&name))?.finalize();
        self.prop(name, Kind::Object, options.schema(schema))
    }

    /// A builder for a model nested under this one, on the same registry
    pub fn nested(&self, name: &str) -> ModelBuilder {
        ModelBuilder::new(format!("{}::{}", self.name, name), &self.registry)
    }

    /// A subclass builder starting from a copy of the current properties
    pub fn inherit(&self, name: impl Into<String>) -> ModelBuilder {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(self.id);

        ModelBuilder {
            id: ModelId::new(),
            name: name.into(),
            ancestors,
            registry: self.registry.share(),
            properties: self.properties.clone(),
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property(&self, name: &str) -> Option<&Type> {
        self.properties.iter().find(|property| property.name() == name)
    }

    /// Properties in declaration order
    pub fn properties(&self) -> &[Type] {
        &self.properties
    }

    /// The accessor table `finalize` installs
    pub fn methods(&self) -> Methods {
        install_methods(&self.properties)
    }

    /// Install accessors for every property and freeze
    pub fn finalize(self) -> Arc<Model> {
        let methods = self.methods();
        debug!(model = %self.name, methods = methods.len(), "finalizing model");
        self.seal(methods, true)
    }

    /// Freeze without installing accessors
    pub fn freeze(self) -> Arc<Model> {
        self.seal(Methods::default(), false)
    }

    fn seal(self, methods: Methods, finalized: bool) -> Arc<Model> {
        let properties: Vec<Type> = self.properties.into_iter().map(Type::finalize).collect();
        let index = properties
            .iter()
            .map(|property| (property.name().to_string(), property.slot()))
            .collect();

        Arc::new(Model {
            id: self.id,
            name: self.name,
            ancestors: self.ancestors,
            registry: self.registry,
            properties,
            index,
            methods,
            finalized,
        })
    }
}

/// A frozen property map
#[derive(Debug)]
pub struct Model {
    id: ModelId,
    name: String,
    ancestors: Vec<ModelId>,
    registry: TypeRegistry,
    properties: Vec<Type>,
    /// Slot by property name
    index: HashMap<String, usize>,
    methods: Methods,
    finalized: bool,
}

impl Model {
    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when this model is `id` or was inherited from it
    pub fn is_a(&self, id: &ModelId) -> bool {
        self.id == *id || self.ancestors.contains(id)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn property(&self, name: &str) -> Option<&Type> {
        self.index.get(name).and_then(|slot| self.properties.get(*slot))
    }

    /// Properties in declaration order
    pub fn properties(&self) -> &[Type] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn methods(&self) -> &Methods {
        &self.methods
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Install accessors on a frozen model; a finalized model is returned as is
    pub fn finalize(self: &Arc<Self>) -> Arc<Self> {
        if self.finalized {
            return Arc::clone(self);
        }

        Arc::new(Model {
            id: self.id,
            name: self.name.clone(),
            ancestors: self.ancestors.clone(),
            registry: self.registry.share(),
            properties: self.properties.clone(),
            index: self.index.clone(),
            methods: install_methods(&self.properties),
            finalized: true,
        })
    }

    /// A subclass builder starting from a copy of this model's properties
    pub fn subclass(&self, name: impl Into<String>) -> ModelBuilder {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(self.id);

        ModelBuilder {
            id: ModelId::new(),
            name: name.into(),
            ancestors,
            registry: self.registry.share(),
            properties: self.properties.clone(),
        }
    }

    /// Build a record, stopping at the first error
    pub fn new_record(self: &Arc<Self>, attributes: &Map<String, Value>) -> SchemaResult<Record> {
        Record::new(Arc::clone(self), attributes)
    }

    /// Build a record from any JSON value; only objects are accepted
    pub fn build(self: &Arc<Self>, value: &Value) -> SchemaResult<Record> {
        match value {
            Value::Object(attributes) => self.new_record(attributes),
            _ => Err(SchemaError::NotAnObject(value_kind(value)).into()),
        }
    }

    /// Build a record, collecting every property error
    pub fn validate(self: &Arc<Self>, attributes: &Map<String, Value>) -> Result<Record, InvalidRecord> {
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for key in attributes.keys().filter(|key| !self.index.contains_key(*key)) {
            errors
                .entry(key.clone())
                .or_default()
                .push("is not a known attribute".to_string());
        }

        let mut record = Record::empty(Arc::clone(self));
        for property in &self.properties {
            if let Err(err) = property.init(&mut record, attributes) {
                let message = match err {
                    Error::Validation(err) => err.message().to_string(),
                    Error::Schema(SchemaError::MissingRequired(_)) => "is required".to_string(),
                    other => other.to_string(),
                };
                errors.entry(property.name().to_string()).or_default().push(message);
            }
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(InvalidRecord::new(self.name.clone(), attributes.clone(), errors))
        }
    }

    pub(crate) fn assert_known_attributes(&self, attributes: &Map<String, Value>) -> Result<(), SchemaError> {
        let unknown: Vec<&String> = attributes
            .keys()
            .filter(|key| !self.index.contains_key(*key))
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::unknown_attributes(unknown.into_iter().cloned()))
        }
    }
}

fn install_methods(properties: &[Type]) -> Methods {
    let mut methods = Methods::default();
    for property in properties {
        property.add_methods(&mut methods);
    }
    methods
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ErrorCategory;
    use serde_json::json;

    fn person(registry: &TypeRegistry) -> Arc<Model> {
        ModelBuilder::new("Person", registry)
            .prop("name", Kind::String, TypeOptions::new().length(1..))
            .unwrap()
            .prop("age", Kind::Integer, TypeOptions::new().range(0..=125).optional())
            .unwrap()
            .prop("admin", Kind::Boolean, TypeOptions::new().with_default(false))
            .unwrap()
            .finalize()
    }

    fn attrs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_declaration_order_fixes_slots() {
        let model = person(&TypeRegistry::default());
        let names: Vec<&str> = model.properties().iter().map(Type::name).collect();
        assert_eq!(names, vec!["name", "age", "admin"]);
        assert_eq!(model.property("admin").map(Type::slot), Some(2));
        assert_eq!(model.len(), 3);
        assert!(model.properties().iter().all(Type::is_finalized));
    }

    #[test]
    fn test_redeclaring_replaces_in_place() {
        let model = ModelBuilder::new("Person", &TypeRegistry::default())
            .prop("name", Kind::String, TypeOptions::new())
            .unwrap()
            .prop("age", Kind::Integer, TypeOptions::new())
            .unwrap()
            .prop("name", Kind::Object, TypeOptions::new())
            .unwrap()
            .freeze();

        assert_eq!(model.len(), 2);
        let name = model.property("name").unwrap();
        assert_eq!(name.slot(), 0);
        assert_eq!(name.class(), crate::schema::TypeClass::Object);
    }

    #[test]
    fn test_unknown_kind_fails_declaration() {
        let err = ModelBuilder::new("Person", &TypeRegistry::default())
            .prop("balance", Kind::named("Money"), TypeOptions::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "type class for Money is unknown");
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_invalid_constraint_fails_declaration() {
        let err = ModelBuilder::new("Person", &TypeRegistry::default())
            .prop("age", Kind::Integer, TypeOptions::new().range(5..=1))
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_EMPTY_RANGE");
    }

    #[test]
    fn test_finalize_installs_methods() {
        let model = person(&TypeRegistry::default());
        assert!(model.is_finalized());
        assert_eq!(model.methods().names(), vec!["admin", "admin?", "age", "name"]);
    }

    #[test]
    fn test_freeze_installs_nothing_until_finalized() {
        let frozen = ModelBuilder::new("Flags", &TypeRegistry::default())
            .prop("admin", Kind::Boolean, TypeOptions::new())
            .unwrap()
            .freeze();
        assert!(!frozen.is_finalized());
        assert!(frozen.methods().is_empty());

        let finalized = frozen.finalize();
        assert_eq!(finalized.id(), frozen.id());
        assert!(finalized.method("admin?").is_some());

        let again = finalized.finalize();
        assert!(Arc::ptr_eq(&again, &finalized));
    }

    #[test]
    fn test_subclass_copies_are_independent() {
        let registry = TypeRegistry::default();
        let parent = ModelBuilder::new("A", &registry)
            .prop("x", Kind::Integer, TypeOptions::new())
            .unwrap()
            .finalize();

        let child = parent
            .subclass("B")
            .prop("y", Kind::String, TypeOptions::new())
            .unwrap()
            .finalize();

        assert!(parent.property("y").is_none());
        assert_eq!(parent.len(), 1);
        assert!(child.property("x").is_some());
        assert!(child.property("y").is_some());
        assert!(child.is_a(&parent.id()));
        assert!(!parent.is_a(&child.id()));
        assert!(child.registry().shares_with(parent.registry()));
    }

    #[test]
    fn test_builder_inherit_is_independent() {
        let parent = ModelBuilder::new("A", &TypeRegistry::default())
            .prop("x", Kind::Integer, TypeOptions::new())
            .unwrap();
        let child = parent
            .inherit("B")
            .prop("x", Kind::String, TypeOptions::new())
            .unwrap();

        assert_eq!(
            parent.property("x").map(Type::class),
            Some(crate::schema::TypeClass::Integer)
        );
        assert_eq!(
            child.property("x").map(Type::class),
            Some(crate::schema::TypeClass::String)
        );

        let parent_id = parent.id();
        assert!(child.finalize().is_a(&parent_id));
    }

    #[test]
    fn test_nested_object_declaration() {
        let model = ModelBuilder::new("Person", &TypeRegistry::default())
            .prop_object("address", TypeOptions::new(), |address| {
                address.prop("city", Kind::String, TypeOptions::new())
            })
            .unwrap()
            .finalize();

        let schema = model.property("address").and_then(Type::schema).unwrap();
        assert_eq!(schema.name(), "Person::address");
        assert!(schema.property("city").is_some());
    }

    #[test]
    fn test_build_requires_object() {
        let model = person(&TypeRegistry::default());
        let err = model.build(&json!([1, 2])).unwrap_err();
        assert_eq!(err, Error::Schema(SchemaError::NotAnObject("Array")));
        assert!(model.build(&json!({ "name": "Dan" })).is_ok());
    }

    #[test]
    fn test_validate_collects_every_error() {
        let model = person(&TypeRegistry::default());
        let input = attrs(json!({ "age": 200, "admin": "yes", "email": "x" }));

        let err = model.validate(&input).unwrap_err();
        assert_eq!(err.model(), "Person");
        assert_eq!(err.input(), &input);
        assert_eq!(err.get("name"), Some(&["is required".to_string()][..]));
        assert_eq!(
            err.get("age"),
            Some(&["must be within 0..125, but was: 200".to_string()][..])
        );
        assert_eq!(
            err.get("admin"),
            Some(&["must be one of [true, false], but was yes".to_string()][..])
        );
        assert_eq!(err.get("email"), Some(&["is not a known attribute".to_string()][..]));
        assert_eq!(err.errors().len(), 4);
    }

    #[test]
    fn test_validate_success() {
        let model = person(&TypeRegistry::default());
        let record = model.validate(&attrs(json!({ "name": "Dan" }))).unwrap();
        assert_eq!(record.get("admin").and_then(|field| field.as_bool()), Some(false));
    }
}
