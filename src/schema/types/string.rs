//! String type: strings whose length is within an inclusive range
//!
//! Length counts Unicode scalar values, not bytes.

use serde_json::Value;

use super::{value_kind, Constraint, Type, TypeClass, TypeOptions};
use crate::outcome::Outcome;
use crate::schema::errors::ConfigError;
use crate::schema::record::FieldValue;
use crate::util::{normalize_integer_range, IntRange};

pub(super) fn build(name: String, options: TypeOptions) -> Result<Type, ConfigError> {
    options.check_supported("String", &["includes", "length"])?;

    let length = match options.length_bounds() {
        Some(bounds) => normalize_integer_range(bounds)?,
        None => IntRange::UNBOUNDED,
    }
    .with_min_default(0);

    if let Some(min) = length.min().filter(|min| *min < 0) {
        return Err(ConfigError::NegativeMinLength(min));
    }
    if let Some(max) = length.max().filter(|max| *max < 0) {
        return Err(ConfigError::NegativeMaxLength(max));
    }
    if length.is_empty() {
        return Err(ConfigError::EmptyLength(length));
    }

    Ok(Type::assemble(TypeClass::String, name, options, Constraint::Length(length)))
}

pub(super) fn parse(length: &IntRange, value: &Value) -> Outcome<FieldValue> {
    match value {
        Value::String(s) => {
            let count = s.chars().count();
            if length.contains(count as i128) {
                Outcome::success(FieldValue::Value(value.clone()))
            } else {
                Outcome::failure(format!(
                    "must have a length within {}, but was: {}",
                    length, count
                ))
            }
        }
        _ => Outcome::failure(format!("must be a String, but was: {}", value_kind(value))),
    }
}
