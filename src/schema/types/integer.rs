//! Integer type: integral values within an inclusive range

use serde_json::Value;

use super::{value_kind, Constraint, Type, TypeClass, TypeOptions};
use crate::outcome::Outcome;
use crate::schema::errors::ConfigError;
use crate::schema::record::FieldValue;
use crate::util::{normalize_integer_range, IntRange};

pub(super) fn build(name: String, options: TypeOptions) -> Result<Type, ConfigError> {
    options.check_supported("Integer", &["includes", "range"])?;

    let range = match options.range_bounds() {
        Some(bounds) => normalize_integer_range(bounds)?,
        None => IntRange::UNBOUNDED,
    };
    if range.is_empty() {
        return Err(ConfigError::EmptyRange(range));
    }

    Ok(Type::assemble(TypeClass::Integer, name, options, Constraint::Range(range)))
}

pub(super) fn parse(range: &IntRange, value: &Value) -> Outcome<FieldValue> {
    let number = match value {
        Value::Number(n) => n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from)),
        _ => None,
    };

    match number {
        None => Outcome::failure(format!("must be an Integer, but was: {}", value_kind(value))),
        Some(n) if !range.contains(n) => {
            Outcome::failure(format!("must be within {}, but was: {}", range, n))
        }
        Some(_) => Outcome::success(FieldValue::Value(value.clone())),
    }
}
