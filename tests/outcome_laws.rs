//! Algebraic properties
//!
//! - Outcome combinator laws
//! - Range normalization is idempotent
//! - Accepted values parse to themselves

use proptest::prelude::*;
use schemata::{normalize_integer_range, FieldValue, Outcome, Type, TypeOptions};
use serde_json::json;

fn halve(n: i64) -> Outcome<i64> {
    if n % 2 == 0 {
        Outcome::success(n / 2)
    } else {
        Outcome::failure(format!("{} is odd", n))
    }
}

fn recover(e: String) -> Outcome<i64> {
    Outcome::success(e.len() as i64)
}

proptest! {
    #[test]
    fn and_then_on_success_applies(v in any::<i64>()) {
        prop_assert_eq!(Outcome::<i64>::success(v).and_then(halve), halve(v));
    }

    #[test]
    fn and_then_on_failure_is_identity(e in ".*") {
        let failure: Outcome<i64> = Outcome::failure(e.clone());
        prop_assert_eq!(failure.and_then(halve), Outcome::failure(e));
    }

    #[test]
    fn or_else_on_success_is_identity(v in any::<i64>()) {
        prop_assert_eq!(Outcome::<i64>::success(v).or_else(recover), Outcome::success(v));
    }

    #[test]
    fn or_else_on_failure_applies(e in ".*") {
        let failure: Outcome<i64> = Outcome::failure(e.clone());
        prop_assert_eq!(failure.or_else(recover), recover(e));
    }

    /// Normalizing twice equals normalizing once.
    #[test]
    fn range_normalization_idempotent(start in -1000i64..1000, end in -1000i64..1000) {
        let once = normalize_integer_range(&(start..end)).unwrap();
        let twice = normalize_integer_range(&once).unwrap();
        prop_assert_eq!(once, twice);

        let inclusive = normalize_integer_range(&(start..=end)).unwrap();
        prop_assert_eq!(normalize_integer_range(&inclusive).unwrap(), inclusive);
    }

    /// Exclusive and inclusive forms of the same range normalize alike.
    #[test]
    fn exclusive_end_matches_inclusive(start in -1000i64..1000, end in -999i64..1000) {
        prop_assert_eq!(
            normalize_integer_range(&(start..end)).unwrap(),
            normalize_integer_range(&(start..=end - 1)).unwrap()
        );
    }

    /// Every integer accepted by a ranged type parses to itself.
    #[test]
    fn integer_parse_round_trip(value in 0i64..=125) {
        let ty = Type::integer("age", TypeOptions::new().range(0..=125)).unwrap();
        let parsed = ty.parse(&json!(value)).unwrap().unwrap();
        prop_assert_eq!(parsed, FieldValue::from(json!(value)));
    }

    /// Every string accepted by a length-bounded type parses to itself.
    #[test]
    fn string_parse_round_trip(value in "[a-z]{1,10}") {
        let ty = Type::string("name", TypeOptions::new().length(1..=10)).unwrap();
        let parsed = ty.parse(&json!(value)).unwrap().unwrap();
        prop_assert_eq!(parsed, FieldValue::from(json!(value)));
    }

    /// Integers outside the range are always rejected.
    #[test]
    fn integer_outside_range_fails(value in 126i64..10_000) {
        let ty = Type::integer("age", TypeOptions::new().range(0..=125)).unwrap();
        prop_assert!(ty.parse(&json!(value)).is_failure());
    }
}
