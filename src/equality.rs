//! Structural equality shared by type descriptors and records
//!
//! Two relations are offered:
//!
//! - `equivalent` (value equality): `other` belongs to `self`'s class or a
//!   subclass of it, and both states are equal after numeric coercion.
//! - `eql` (strict equality): `other` belongs to exactly `self`'s class and
//!   both states are equal without coercion.
//!
//! `hash_code` is `hash(class) ^ hash(state)` and agrees with `eql` only.
//! Instances that are `equivalent` across a subclass boundary may hash
//! differently. Implementors wire `PartialEq`, `Eq` and `Hash` to `eql` and
//! `hash_code`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde_json::{Map, Number, Value};

/// How two states are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Numerically equal numbers compare equal (`1 == 1.0`)
    Coercing,
    /// Values must be identical, including their numeric representation
    Strict,
}

/// Structural equality over a class identity and an object state
pub trait Equality {
    /// Identity of the exact class of an instance
    type Class: PartialEq + Hash;

    fn class(&self) -> Self::Class;

    /// True when `self` is an instance of `class` or of one of its subclasses
    fn is_a(&self, class: &Self::Class) -> bool;

    fn state_eq(&self, other: &Self, comparison: Comparison) -> bool;

    fn hash_state<H: Hasher>(&self, state: &mut H);

    /// Value equality; `other` may be an instance of a subclass
    fn equivalent(&self, other: &Self) -> bool {
        other.is_a(&self.class()) && self.state_eq(other, Comparison::Coercing)
    }

    /// Strict equality; `other` must be an instance of exactly this class
    fn eql(&self, other: &Self) -> bool {
        other.class() == self.class() && self.state_eq(other, Comparison::Strict)
    }

    fn hash_code(&self) -> u64 {
        let mut class = DefaultHasher::new();
        self.class().hash(&mut class);

        let mut state = DefaultHasher::new();
        self.hash_state(&mut state);

        class.finish() ^ state.finish()
    }
}

/// Destructuring access to an object's fields
pub trait Deconstruct {
    /// The field mapping, in declaration order
    fn object_state(&self) -> Map<String, Value>;

    /// The requested fields in the order requested; unknown and repeated
    /// keys are dropped. `None` selects all, in declaration order.
    fn deconstruct_keys(&self, keys: Option<&[&str]>) -> Map<String, Value> {
        let mut state = self.object_state();
        match keys {
            None => state,
            Some(keys) => keys
                .iter()
                .filter_map(|key| state.remove(*key).map(|value| (key.to_string(), value)))
                .collect(),
        }
    }

    /// The field values, in declaration order
    fn deconstruct(&self) -> Vec<Value> {
        self.object_state().into_iter().map(|(_, value)| value).collect()
    }
}

/// A payload that can compare and hash itself under either comparison
pub trait Comparable {
    fn compare(&self, other: &Self, comparison: Comparison) -> bool;

    /// Feeds the payload into `state`, consistently with strict comparison
    fn feed_hash<H: Hasher>(&self, state: &mut H);
}

impl Comparable for Value {
    fn compare(&self, other: &Self, comparison: Comparison) -> bool {
        values_eq(self, other, comparison)
    }

    fn feed_hash<H: Hasher>(&self, state: &mut H) {
        hash_value(self, state);
    }
}

macro_rules! comparable_by_eq {
    ($($ty:ty),*) => {
        $(
            impl Comparable for $ty {
                fn compare(&self, other: &Self, _comparison: Comparison) -> bool {
                    self == other
                }

                fn feed_hash<H: Hasher>(&self, state: &mut H) {
                    self.hash(state);
                }
            }
        )*
    };
}

comparable_by_eq!(String, bool, i64, u64, usize);

/// Compares two JSON values
pub fn values_eq(a: &Value, b: &Value, comparison: Comparison) -> bool {
    if comparison == Comparison::Strict {
        return a == b;
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_eq(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys)
                    .all(|(x, y)| values_eq(x, y, Comparison::Coercing))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm.iter().all(|(key, x)| {
                    ym.get(key)
                        .is_some_and(|y| values_eq(x, y, Comparison::Coercing))
                })
        }
        _ => a == b,
    }
}

/// Compares two optional JSON values
pub fn options_eq(a: Option<&Value>, b: Option<&Value>, comparison: Comparison) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => values_eq(a, b, comparison),
        (None, None) => true,
        _ => false,
    }
}

fn numbers_eq(x: &Number, y: &Number) -> bool {
    if x.is_f64() || y.is_f64() {
        return match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        };
    }
    integer(x) == integer(y)
}

fn integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Feeds a JSON value into `state`, consistently with strict equality.
///
/// Object keys are hashed in sorted order, since map equality ignores order.
pub fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Null => 0u8.hash(state),
        Value::Bool(b) => {
            1u8.hash(state);
            b.hash(state);
        }
        Value::Number(n) => {
            2u8.hash(state);
            if let Some(i) = integer(n) {
                i.hash(state);
            } else if let Some(f) = n.as_f64() {
                // 0.0 and -0.0 compare equal
                let f = if f == 0.0 { 0.0 } else { f };
                f.to_bits().hash(state);
            }
        }
        Value::String(s) => {
            3u8.hash(state);
            s.hash(state);
        }
        Value::Array(items) => {
            4u8.hash(state);
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Object(map) => {
            5u8.hash(state);
            map.len().hash(state);
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                key.hash(state);
                hash_value(&map[key.as_str()], state);
            }
        }
    }
}
