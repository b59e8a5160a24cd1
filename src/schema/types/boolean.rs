//! Boolean type: values restricted to `true` and `false`

use serde_json::Value;

use super::{Constraint, Type, TypeClass, TypeOptions};
use crate::schema::errors::ConfigError;
use crate::schema::methods::{Method, Methods};
use crate::schema::record::{FieldValue, Record};

pub(super) fn build(name: String, options: TypeOptions) -> Result<Type, ConfigError> {
    options.check_supported("Boolean", &[])?;
    Ok(assemble(name, options))
}

pub(super) fn assemble(name: String, options: TypeOptions) -> Type {
    let options = options.includes([true, false]);
    Type::assemble(TypeClass::Boolean, name, options, Constraint::None)
}

/// Installs `<name>?` beside the reader
pub(super) fn add_methods(ty: &Type, methods: &mut Methods) {
    methods.define(format!("{}?", ty.name()), Method::new(ty.slot(), query));
}

fn query(record: &Record, slot: usize) -> FieldValue {
    let set = matches!(record.slot(slot), FieldValue::Value(Value::Bool(true)));
    FieldValue::Value(Value::Bool(set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;
    use serde_json::json;

    #[test]
    fn test_includes_is_fixed() {
        let ty = Type::boolean("admin");
        assert_eq!(ty.includes(), Some(&[json!(true), json!(false)][..]));
        assert_eq!(ty.class(), TypeClass::Boolean);
    }

    #[test]
    fn test_parse() {
        let ty = Type::boolean("admin");
        assert_eq!(ty.parse(&json!(true)), Outcome::success(FieldValue::from(json!(true))));
        assert_eq!(ty.parse(&json!(false)), Outcome::success(FieldValue::from(json!(false))));
        assert_eq!(
            ty.parse(&json!("yes")),
            Outcome::failure("must be one of [true, false], but was yes".to_string())
        );
    }

    #[test]
    fn test_includes_option_is_rejected() {
        let err = TypeClass::Boolean
            .build("admin", TypeOptions::new().includes([true]))
            .unwrap_err();
        assert_eq!(err, ConfigError::unsupported("includes", "Boolean"));
    }

    #[test]
    fn test_base_options_are_kept() {
        let ty = TypeClass::Boolean
            .build("admin", TypeOptions::new().optional().with_default(false))
            .unwrap();
        assert!(!ty.is_required());
        assert_eq!(ty.default(), Some(&json!(false)));
    }

    #[test]
    fn test_add_methods_defines_query() {
        let ty = Type::boolean("admin");
        let mut methods = Methods::default();
        ty.add_methods(&mut methods);
        assert!(methods.contains("admin"));
        assert!(methods.contains("admin?"));
    }
}
