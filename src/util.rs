//! Integer range canonicalization
//!
//! Integer and String constraints are stored as inclusive ranges with
//! optional bounds. Any `RangeBounds<i64>` is accepted on input and reduced
//! to that canonical form once, at type construction.

use std::fmt;
use std::ops::{Bound, RangeBounds};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::schema::ConfigError;

/// Inclusive integer range; a `None` bound is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IntRange {
    min: Option<i64>,
    max: Option<i64>,
}

impl IntRange {
    /// The range with neither bound set
    pub const UNBOUNDED: IntRange = IntRange {
        min: None,
        max: None,
    };

    pub const fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    /// Returns the lower bound
    pub fn min(&self) -> Option<i64> {
        self.min
    }

    /// Returns the upper bound
    pub fn max(&self) -> Option<i64> {
        self.max
    }

    /// True when both bounds are set and the upper is below the lower
    pub fn is_empty(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if max < min)
    }

    /// Checks membership; takes `i128` so every JSON integer can be tested.
    pub fn contains(&self, value: i128) -> bool {
        self.min.map_or(true, |min| value >= i128::from(min))
            && self.max.map_or(true, |max| value <= i128::from(max))
    }

    /// Replaces an open lower bound with `min`
    pub fn with_min_default(self, min: i64) -> Self {
        Self {
            min: self.min.or(Some(min)),
            max: self.max,
        }
    }

    /// JSON form used in object state
    pub fn to_value(&self) -> Value {
        json!({ "min": self.min, "max": self.max })
    }
}

impl RangeBounds<i64> for IntRange {
    fn start_bound(&self) -> Bound<&i64> {
        self.min.as_ref().map_or(Bound::Unbounded, Bound::Included)
    }

    fn end_bound(&self) -> Bound<&i64> {
        self.max.as_ref().map_or(Bound::Unbounded, Bound::Included)
    }
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(min) = self.min {
            write!(f, "{}", min)?;
        }
        write!(f, "..")?;
        if let Some(max) = self.max {
            write!(f, "{}", max)?;
        }
        Ok(())
    }
}

/// Reduces any integer range to its canonical inclusive form.
///
/// An excluded end is decremented by one and an excluded start incremented
/// by one. Open bounds stay open.
pub fn normalize_integer_range<R>(range: &R) -> Result<IntRange, ConfigError>
where
    R: RangeBounds<i64> + ?Sized,
{
    let min = match range.start_bound() {
        Bound::Included(&n) => Some(n),
        Bound::Excluded(&n) => Some(
            n.checked_add(1)
                .ok_or_else(|| ConfigError::BoundOverflow(format!("excluded start {}", n)))?,
        ),
        Bound::Unbounded => None,
    };

    let max = match range.end_bound() {
        Bound::Included(&n) => Some(n),
        Bound::Excluded(&n) => Some(
            n.checked_sub(1)
                .ok_or_else(|| ConfigError::BoundOverflow(format!("excluded end {}", n)))?,
        ),
        Bound::Unbounded => None,
    };

    Ok(IntRange { min, max })
}
