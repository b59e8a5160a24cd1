//! Success/Failure result algebra
//!
//! `Outcome` is what every parse step returns. Validation failures travel
//! as values through `and_then` chains; only `unwrap` and `unwrap_failure`
//! turn an outcome into an `Err`.
//!
//! An outcome owns its payload outright and offers no way to mutate it, so
//! a finished outcome can be handed to any number of threads as long as the
//! payload types are `Send + Sync`.
//!
//! Rust `==` and `Hash` are strict. Value equality, which treats `1` and
//! `1.0` as equal payloads, is `Equality::equivalent`.

use std::hash::Hasher;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::equality::{Comparable, Comparison, Deconstruct, Equality};
use crate::schema::{Error, Raise};

/// The outcome of a fallible computation: exactly one of a success value or
/// a failure payload.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome<V, E = String> {
    Success(V),
    Failure(E),
}

impl<V, E> Outcome<V, E> {
    pub fn success(value: V) -> Self {
        Outcome::Success(value)
    }

    pub fn failure(error: E) -> Self {
        Outcome::Failure(error)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Runs `f` on the success value; a failure is passed through untouched.
    pub fn and_then<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(V) -> Outcome<U, E>,
    {
        match self {
            Outcome::Success(value) => f(value),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Runs `f` on the failure payload; a success is passed through untouched.
    pub fn or_else<G, F>(self, f: F) -> Outcome<V, G>
    where
        F: FnOnce(E) -> Outcome<V, G>,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(error) => f(error),
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(V) -> U,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    pub fn map_failure<G, F>(self, f: F) -> Outcome<V, G>
    where
        F: FnOnce(E) -> G,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(error) => Outcome::Failure(f(error)),
        }
    }

    pub fn as_ref(&self) -> Outcome<&V, &E> {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Returns the success value, or raises the failure payload.
    ///
    /// Payloads that are already errors are raised as themselves; strings
    /// are raised as `Error::Message`.
    pub fn unwrap(self) -> Result<V, Error>
    where
        E: Raise,
    {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error.raise()),
        }
    }

    /// Returns the failure payload; a success raises `Error::UnwrapFailure`.
    pub fn unwrap_failure(self) -> Result<E, Error> {
        match self {
            Outcome::Success(_) => Err(Error::UnwrapFailure),
            Outcome::Failure(error) => Ok(error),
        }
    }

    pub fn into_result(self) -> Result<V, E> {
        self.into()
    }
}

/// The variant of an outcome, its class under `Equality`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeClass {
    Success,
    Failure,
}

impl<V: Comparable, E: Comparable> Equality for Outcome<V, E> {
    type Class = OutcomeClass;

    fn class(&self) -> OutcomeClass {
        match self {
            Outcome::Success(_) => OutcomeClass::Success,
            Outcome::Failure(_) => OutcomeClass::Failure,
        }
    }

    fn is_a(&self, class: &OutcomeClass) -> bool {
        self.class() == *class
    }

    fn state_eq(&self, other: &Self, comparison: Comparison) -> bool {
        match (self, other) {
            (Outcome::Success(a), Outcome::Success(b)) => a.compare(b, comparison),
            (Outcome::Failure(a), Outcome::Failure(b)) => a.compare(b, comparison),
            _ => false,
        }
    }

    fn hash_state<H: Hasher>(&self, state: &mut H) {
        match self {
            Outcome::Success(value) => value.feed_hash(state),
            Outcome::Failure(error) => error.feed_hash(state),
        }
    }
}

impl<V: Serialize, E: Serialize> Deconstruct for Outcome<V, E> {
    /// `{ "value": .. }` for a success, `{ "error": .. }` for a failure
    fn object_state(&self) -> Map<String, Value> {
        let (key, payload) = match self {
            Outcome::Success(value) => ("value", serde_json::to_value(value)),
            Outcome::Failure(error) => ("error", serde_json::to_value(error)),
        };

        let mut state = Map::new();
        state.insert(key.to_string(), payload.unwrap_or(Value::Null));
        state
    }
}

impl<V, E> From<Result<V, E>> for Outcome<V, E> {
    fn from(result: Result<V, E>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Failure(error),
        }
    }
}

impl<V, E> From<Outcome<V, E>> for Result<V, E> {
    fn from(outcome: Outcome<V, E>) -> Self {
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn halve(n: i64) -> Outcome<i64> {
        if n % 2 == 0 {
            Outcome::success(n / 2)
        } else {
            Outcome::failure(format!("{} is odd", n))
        }
    }

    #[test]
    fn test_predicates() {
        let success: Outcome<i64> = Outcome::success(1);
        let failure: Outcome<i64> = Outcome::failure("nope".to_string());

        assert!(success.is_success());
        assert!(!success.is_failure());
        assert!(failure.is_failure());
        assert!(!failure.is_success());
    }

    #[test]
    fn test_and_then_chains_successes() {
        assert_eq!(Outcome::success(8).and_then(halve).and_then(halve), Outcome::success(2));
    }

    #[test]
    fn test_and_then_stops_at_first_failure() {
        let result = Outcome::success(6).and_then(halve).and_then(halve).and_then(halve);
        assert_eq!(result, Outcome::failure("3 is odd".to_string()));
    }

    #[test]
    fn test_or_else_recovers_failures() {
        let recovered = halve(3).or_else(|_| Outcome::<i64, String>::success(0));
        assert_eq!(recovered, Outcome::success(0));

        let untouched = halve(4).or_else(|_| Outcome::<i64, String>::success(0));
        assert_eq!(untouched, Outcome::success(2));
    }

    #[test]
    fn test_map_and_map_failure_keep_the_variant() {
        assert_eq!(halve(4).map(|n| n + 1), Outcome::success(3));
        assert_eq!(halve(3).map(|n| n + 1), Outcome::failure("3 is odd".to_string()));

        assert_eq!(halve(3).map_failure(|e| e.len()), Outcome::failure(8));
        assert_eq!(halve(4).map_failure(|e| e.len()), Outcome::success(2));
    }

    #[test]
    fn test_unwrap() {
        assert_eq!(halve(4).unwrap(), Ok(2));
        assert_eq!(halve(3).unwrap(), Err(Error::Message("3 is odd".into())));
    }

    #[test]
    fn test_unwrap_raises_error_payloads_as_themselves() {
        let outcome: Outcome<i64, Error> = Outcome::failure(Error::internal("boom"));
        assert_eq!(outcome.unwrap(), Err(Error::internal("boom")));
    }

    #[test]
    fn test_unwrap_failure() {
        assert_eq!(halve(3).unwrap_failure(), Ok("3 is odd".to_string()));

        let err = halve(4).unwrap_failure().unwrap_err();
        assert_eq!(err, Error::UnwrapFailure);
        assert_eq!(err.to_string(), "Cannot unwrap failure from success");
    }

    #[test]
    fn test_equality_requires_same_variant() {
        let success: Outcome<String, String> = Outcome::success("x".into());
        let failure: Outcome<String, String> = Outcome::failure("x".into());
        assert_ne!(success, failure);
        assert_eq!(success, Outcome::success("x".to_string()));
    }

    #[test]
    fn test_value_equality_coerces_payloads() {
        let a: Outcome<Value> = Outcome::success(json!(1));
        let b: Outcome<Value> = Outcome::success(json!(1.0));

        assert!(a.equivalent(&b));
        assert!(b.equivalent(&a));
        assert!(!a.eql(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_success_never_equals_failure() {
        let success: Outcome<Value, Value> = Outcome::success(json!("x"));
        let failure: Outcome<Value, Value> = Outcome::failure(json!("x"));

        assert!(!success.equivalent(&failure));
        assert!(!failure.equivalent(&success));
        assert!(!success.eql(&failure));
        assert_ne!(success.hash_code(), failure.hash_code());
    }

    #[test]
    fn test_eql_outcomes_hash_equally() {
        let a: Outcome<Value> = Outcome::failure("nope".to_string());
        let b: Outcome<Value> = Outcome::failure("nope".to_string());

        assert!(a.eql(&b));
        assert_eq!(a.hash_code(), b.hash_code());
        assert!(!a.eql(&Outcome::failure("other".to_string())));
    }

    #[test]
    fn test_deconstruct() {
        let success: Outcome<Value> = Outcome::success(json!(1));
        assert_eq!(success.deconstruct_keys(None), json_map(json!({ "value": 1 })));
        assert_eq!(success.deconstruct(), vec![json!(1)]);
        assert!(success.deconstruct_keys(Some(&["error"])).is_empty());

        let failure: Outcome<Value> = Outcome::failure("nope".to_string());
        assert_eq!(
            failure.deconstruct_keys(Some(&["error"])),
            json_map(json!({ "error": "nope" }))
        );
        assert_eq!(failure.deconstruct(), vec![json!("nope")]);
    }

    #[test]
    fn test_result_conversions() {
        let outcome: Outcome<i64, String> = Ok(1).into();
        assert_eq!(outcome, Outcome::success(1));
        assert_eq!(halve(3).into_result(), Err("3 is odd".to_string()));
    }

    #[test]
    fn test_shareable_across_threads() {
        let outcome = std::sync::Arc::new(halve(10));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let outcome = std::sync::Arc::clone(&outcome);
                std::thread::spawn(move || (*outcome).clone().unwrap().unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 5);
        }
    }
}
