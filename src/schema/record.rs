//! Records: validated attribute sets bound to a model
//!
//! A record holds one field per property, addressed by the slot fixed at
//! declaration. Construction rejects unknown keys first, then initializes
//! each property in declaration order and stops at the first error.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::trace;

use super::errors::SchemaResult;
use super::model::{Model, ModelId};
use crate::equality::{hash_value, values_eq, Comparable, Comparison, Deconstruct, Equality};

/// The value of one record field
#[derive(Debug, Clone)]
pub enum FieldValue {
    Value(Value),
    /// A record of a nested schema
    Record(Record),
}

static NULL_FIELD: FieldValue = FieldValue::NULL;

impl FieldValue {
    pub const NULL: FieldValue = FieldValue::Value(Value::Null);

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Value(Value::Null))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Value(value) => Some(value),
            FieldValue::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(record) => Some(record),
            FieldValue::Value(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// JSON form; nested records become maps
    pub fn to_value(&self) -> Value {
        match self {
            FieldValue::Value(value) => value.clone(),
            FieldValue::Record(record) => record.to_value(),
        }
    }

    /// Compares two fields.
    ///
    /// Under coercing comparison a nested record equals a map when a record
    /// of the nested schema built from that map equals it.
    pub fn eq_with(&self, other: &FieldValue, comparison: Comparison) -> bool {
        match (self, other) {
            (FieldValue::Value(a), FieldValue::Value(b)) => values_eq(a, b, comparison),
            (FieldValue::Record(a), FieldValue::Record(b)) => match comparison {
                Comparison::Coercing => a.equivalent(b),
                Comparison::Strict => a.eql(b),
            },
            (FieldValue::Record(record), FieldValue::Value(Value::Object(map)))
            | (FieldValue::Value(Value::Object(map)), FieldValue::Record(record))
                if comparison == Comparison::Coercing =>
            {
                record
                    .model()
                    .new_record(map)
                    .is_ok_and(|built| record.equivalent(&built))
            }
            _ => false,
        }
    }

    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) {
        match self {
            FieldValue::Value(value) => hash_value(value, state),
            FieldValue::Record(record) => state.write_u64(record.hash_code()),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.eq_with(other, Comparison::Strict)
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash_into(state);
    }
}

impl Comparable for FieldValue {
    fn compare(&self, other: &Self, comparison: Comparison) -> bool {
        self.eq_with(other, comparison)
    }

    fn feed_hash<H: Hasher>(&self, state: &mut H) {
        self.hash_into(state);
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

impl From<Record> for FieldValue {
    fn from(record: Record) -> Self {
        FieldValue::Record(record)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Value(value) => value.serialize(serializer),
            FieldValue::Record(record) => record.serialize(serializer),
        }
    }
}

/// A validated instance of a model
#[derive(Clone)]
pub struct Record {
    model: Arc<Model>,
    slots: Vec<FieldValue>,
}

impl Record {
    /// Build a record from `attributes`.
    ///
    /// Unknown keys raise `SchemaError::UnknownAttributes` before any
    /// property is initialized.
    pub fn new(model: Arc<Model>, attributes: &Map<String, Value>) -> SchemaResult<Self> {
        model.assert_known_attributes(attributes)?;

        let mut record = Self::empty(Arc::clone(&model));
        for property in model.properties() {
            property.init(&mut record, attributes)?;
        }

        trace!(model = model.name(), fields = record.slots.len(), "record constructed");
        Ok(record)
    }

    pub(crate) fn empty(model: Arc<Model>) -> Self {
        let slots = vec![FieldValue::NULL; model.len()];
        Self { model, slots }
    }

    pub(crate) fn slot(&self, slot: usize) -> &FieldValue {
        self.slots.get(slot).unwrap_or(&NULL_FIELD)
    }

    pub(crate) fn put(&mut self, slot: usize, value: FieldValue) {
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, FieldValue::NULL);
        }
        self.slots[slot] = value;
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// The field of property `name`
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.model.property(name).map(|property| property.get(self))
    }

    /// Calls an installed accessor
    pub fn send(&self, method: &str) -> Option<FieldValue> {
        self.model.method(method).map(|method| method.call(self))
    }

    pub fn respond_to(&self, method: &str) -> bool {
        self.model.method(method).is_some()
    }

    /// Calls the `<name>?` query of a Boolean property
    pub fn query(&self, name: &str) -> Option<bool> {
        self.send(&format!("{}?", name)).and_then(|field| field.as_bool())
    }

    /// JSON map of the fields in declaration order
    pub fn to_value(&self) -> Value {
        Value::Object(self.object_state())
    }

    fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.model
            .properties()
            .iter()
            .map(move |property| (property.name(), property.get(self)))
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.model.name())?;
        f.debug_map().entries(self.fields()).finish()
    }
}

impl Equality for Record {
    type Class = ModelId;

    fn class(&self) -> ModelId {
        self.model.id()
    }

    fn is_a(&self, class: &ModelId) -> bool {
        self.model.is_a(class)
    }

    fn state_eq(&self, other: &Self, comparison: Comparison) -> bool {
        self.model.len() == other.model.len()
            && self.fields().all(|(name, field)| {
                other
                    .get(name)
                    .is_some_and(|theirs| field.eq_with(theirs, comparison))
            })
    }

    fn hash_state<H: Hasher>(&self, state: &mut H) {
        for (name, field) in self.fields() {
            name.hash(state);
            field.hash_into(state);
        }
    }
}

impl Comparable for Record {
    fn compare(&self, other: &Self, comparison: Comparison) -> bool {
        match comparison {
            Comparison::Coercing => self.equivalent(other),
            Comparison::Strict => self.eql(other),
        }
    }

    fn feed_hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl Deconstruct for Record {
    fn object_state(&self) -> Map<String, Value> {
        self.fields()
            .map(|(name, field)| (name.to_string(), field.to_value()))
            .collect()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.eql(other)
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.model.len()))?;
        for (name, field) in self.fields() {
            map.serialize_entry(name, field)?;
        }
        map.end()
    }
}
