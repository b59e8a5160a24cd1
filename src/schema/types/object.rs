//! Object type: any value, or a nested record when a schema is given

use std::sync::Arc;

use serde_json::Value;

use super::{value_kind, Constraint, Type, TypeClass, TypeOptions};
use crate::outcome::Outcome;
use crate::schema::errors::ConfigError;
use crate::schema::model::Model;
use crate::schema::record::FieldValue;

pub(super) fn build(name: String, options: TypeOptions) -> Result<Type, ConfigError> {
    options.check_supported("Object", &["includes", "schema"])?;
    Ok(assemble(name, options))
}

pub(super) fn assemble(name: String, options: TypeOptions) -> Type {
    let constraint = match options.nested_schema() {
        Some(model) => Constraint::Schema(Arc::clone(model)),
        None => Constraint::None,
    };
    Type::assemble(TypeClass::Object, name, options, constraint)
}

/// Builds a nested record from a map; record errors become failure messages
pub(super) fn parse(model: &Arc<Model>, value: &Value) -> Outcome<FieldValue> {
    match value {
        Value::Object(attributes) => Outcome::from(model.new_record(attributes))
            .map(FieldValue::Record)
            .map_failure(|err| err.to_string()),
        _ => Outcome::failure(format!("must be an Object, but was: {}", value_kind(value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Kind, ModelBuilder, TypeRegistry};
    use serde_json::json;

    fn address() -> Arc<Model> {
        let registry = TypeRegistry::default();
        ModelBuilder::new("Address", &registry)
            .prop("city", Kind::String, TypeOptions::new().length(1..))
            .unwrap()
            .finalize()
    }

    #[test]
    fn test_plain_object_accepts_anything() {
        let ty = Type::object("payload");
        for value in [json!(null), json!(1), json!("x"), json!([1]), json!({ "a": 1 })] {
            assert_eq!(ty.parse(&value), Outcome::success(FieldValue::Value(value.clone())));
        }
    }

    #[test]
    fn test_schema_builds_nested_record() {
        let model = address();
        let ty = TypeClass::Object
            .build("address", TypeOptions::new().schema(Arc::clone(&model)))
            .unwrap();

        assert_eq!(ty.schema().map(|m| m.id()), Some(model.id()));

        let field = ty.parse(&json!({ "city": "Lisbon" })).unwrap().unwrap();
        let record = field.as_record().unwrap();
        assert_eq!(record.get("city").and_then(FieldValue::as_str), Some("Lisbon"));
    }

    #[test]
    fn test_schema_failures_are_messages() {
        let ty = TypeClass::Object
            .build("address", TypeOptions::new().schema(address()))
            .unwrap();

        assert_eq!(
            ty.parse(&json!({ "zip": "1000" })),
            Outcome::failure("Unknown attributes: zip".to_string())
        );
        assert_eq!(
            ty.parse(&json!({ "city": "" })),
            Outcome::failure("city must have a length within 1.., but was: 0".to_string())
        );
        assert_eq!(
            ty.parse(&json!("Lisbon")),
            Outcome::failure("must be an Object, but was: String".to_string())
        );
    }
}
