//! Schema error types
//!
//! Error categories:
//! - CONFIGURATION: invalid constraint definitions, raised when a type is built
//! - VALIDATION: a value rejected by `Type::parse`, raised only through `unwrap`
//! - SCHEMA: unknown or missing attributes at record construction
//! - MISUSE: unwrapping the wrong side of an `Outcome`
//! - INTERNAL: a poisoned registry lock

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::Kind;
use crate::util::IntRange;

/// Category of an error, as laid out in the error taxonomy above
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Constraint definitions that can never be satisfied
    Configuration,
    /// A value that does not satisfy its type
    Validation,
    /// Attributes that do not fit the property map
    Schema,
    /// Unwrapping the wrong side of an outcome
    Misuse,
    /// Broken internal state
    Internal,
}

impl ErrorCategory {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "CONFIGURATION",
            ErrorCategory::Validation => "VALIDATION",
            ErrorCategory::Schema => "SCHEMA",
            ErrorCategory::Misuse => "MISUSE",
            ErrorCategory::Internal => "INTERNAL",
        }
    }

    /// Whether an error of this category can be handled by fixing the input
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorCategory::Validation | ErrorCategory::Schema)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Invalid type declarations, raised immediately when a `Type` is built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("range cannot be empty, but was: {0}")]
    EmptyRange(IntRange),

    #[error("length.begin must be greater than or equal to 0, but was {0}")]
    NegativeMinLength(i64),

    #[error("length.end must be greater than or equal to 0 or nil, but was {0}")]
    NegativeMaxLength(i64),

    #[error("length.end must be greater than or equal to length.begin, but was: {0}")]
    EmptyLength(IntRange),

    #[error("range bound overflows a 64-bit integer: {0}")]
    BoundOverflow(String),

    #[error("type class for {0} is unknown")]
    UnknownKind(Kind),

    #[error("option `{option}` is not supported by the {class} type")]
    UnsupportedOption {
        option: &'static str,
        class: &'static str,
    },
}

impl ConfigError {
    /// Create an unsupported option error
    pub fn unsupported(option: &'static str, class: &'static str) -> Self {
        ConfigError::UnsupportedOption { option, class }
    }
}

/// Attribute sets that do not fit a model's property map
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Unknown attributes: {}", .0.join(", "))]
    UnknownAttributes(Vec<String>),

    #[error("Missing required property: {0}")]
    MissingRequired(String),

    #[error("attributes must be an Object, but was: {0}")]
    NotAnObject(&'static str),
}

impl SchemaError {
    /// Create an unknown attributes error; the keys are reported sorted
    pub fn unknown_attributes<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        keys.sort();
        SchemaError::UnknownAttributes(keys)
    }

    /// Create a missing required property error
    pub fn missing_required(property: impl Into<String>) -> Self {
        SchemaError::MissingRequired(property.into())
    }
}

/// A parse failure bound to the property it was raised for
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{property} {message}")]
pub struct ValidationError {
    property: String,
    message: String,
}

impl ValidationError {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }

    /// Returns the property that failed
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Returns the parse failure message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Every property error found for one attribute set
///
/// Built by `Model::validate`, which keeps going after the first failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid {model} with input: {} and errors: {errors:?}", display_input(.input))]
pub struct InvalidRecord {
    model: String,
    input: Map<String, Value>,
    errors: BTreeMap<String, Vec<String>>,
}

impl InvalidRecord {
    pub fn new(
        model: impl Into<String>,
        input: Map<String, Value>,
        errors: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            model: model.into(),
            input,
            errors,
        }
    }

    /// Returns the name of the model that rejected the input
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the rejected input
    pub fn input(&self) -> &Map<String, Value> {
        &self.input
    }

    /// Returns the errors keyed by property
    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Returns the errors for one property, if it had any
    pub fn get(&self, property: &str) -> Option<&[String]> {
        self.errors.get(property).map(Vec::as_slice)
    }
}

fn display_input(input: &Map<String, Value>) -> String {
    Value::Object(input.clone()).to_string()
}

/// Crate-wide error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Invalid(#[from] InvalidRecord),

    /// A failure payload raised as a plain message
    #[error("{0}")]
    Message(String),

    #[error("Cannot unwrap failure from success")]
    UnwrapFailure,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) => ErrorCategory::Configuration,
            Error::Schema(_) => ErrorCategory::Schema,
            Error::Validation(_) | Error::Invalid(_) | Error::Message(_) => {
                ErrorCategory::Validation
            }
            Error::UnwrapFailure => ErrorCategory::Misuse,
            Error::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(ConfigError::EmptyRange(_)) => "CONFIG_EMPTY_RANGE",
            Error::Config(ConfigError::NegativeMinLength(_))
            | Error::Config(ConfigError::NegativeMaxLength(_)) => "CONFIG_NEGATIVE_LENGTH",
            Error::Config(ConfigError::EmptyLength(_)) => "CONFIG_EMPTY_LENGTH",
            Error::Config(ConfigError::BoundOverflow(_)) => "CONFIG_BOUND_OVERFLOW",
            Error::Config(ConfigError::UnknownKind(_)) => "CONFIG_UNKNOWN_KIND",
            Error::Config(ConfigError::UnsupportedOption { .. }) => "CONFIG_UNSUPPORTED_OPTION",
            Error::Schema(SchemaError::UnknownAttributes(_)) => "SCHEMA_UNKNOWN_ATTRIBUTES",
            Error::Schema(SchemaError::MissingRequired(_)) => "SCHEMA_MISSING_REQUIRED",
            Error::Schema(SchemaError::NotAnObject(_)) => "SCHEMA_NOT_AN_OBJECT",
            Error::Validation(_) | Error::Message(_) => "VALIDATION_FAILED",
            Error::Invalid(_) => "VALIDATION_INVALID_RECORD",
            Error::UnwrapFailure => "MISUSE_UNWRAP_FAILURE",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, Error>;

/// Conversion of a failure payload into a raised error
///
/// Error values are raised as themselves; plain strings become
/// `Error::Message`.
pub trait Raise {
    fn raise(self) -> Error;
}

impl Raise for Error {
    fn raise(self) -> Error {
        self
    }
}

impl Raise for String {
    fn raise(self) -> Error {
        Error::Message(self)
    }
}

impl Raise for &str {
    fn raise(self) -> Error {
        Error::Message(self.to_string())
    }
}

impl Raise for ConfigError {
    fn raise(self) -> Error {
        self.into()
    }
}

impl Raise for SchemaError {
    fn raise(self) -> Error {
        self.into()
    }
}

impl Raise for ValidationError {
    fn raise(self) -> Error {
        self.into()
    }
}

impl Raise for InvalidRecord {
    fn raise(self) -> Error {
        self.into()
    }
}
