//! Registry configuration
//!
//! Owned by a `TypeRegistry` and shared by every model declared through it.

use serde::{Deserialize, Serialize};

/// What `TypeRegistry::lookup` does with a kind that has no registered class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKindPolicy {
    /// Fail with `ConfigError::UnknownKind`
    #[default]
    Reject,
    /// Use the Object type class
    FallbackToObject,
}

/// Configuration for type lookup and record construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Policy for kinds with no registered type class.
    pub unknown_kind: UnknownKindPolicy,
    /// Treat an explicit `null` attribute like an omitted key.
    pub null_is_absent: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            unknown_kind: UnknownKindPolicy::Reject,
            null_is_absent: true,
        }
    }
}

impl RegistryConfig {
    /// Create config that rejects unknown kinds.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Create config that falls back to the Object class for unknown kinds.
    pub fn lenient() -> Self {
        Self {
            unknown_kind: UnknownKindPolicy::FallbackToObject,
            ..Self::default()
        }
    }

    /// Keep explicit `null` attributes as values.
    pub fn with_explicit_nulls(mut self) -> Self {
        self.null_is_absent = false;
        self
    }
}
