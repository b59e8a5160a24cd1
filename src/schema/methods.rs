//! Accessor table installed at finalize
//!
//! Each property contributes a reader bound to its slot; Boolean properties
//! add a `<name>?` query. Records dispatch `send` through this table.

use std::collections::HashMap;

use super::record::{FieldValue, Record};

/// Reads a value out of a record slot
pub type Accessor = fn(&Record, usize) -> FieldValue;

/// A named accessor bound to one slot
#[derive(Debug, Clone, Copy)]
pub struct Method {
    slot: usize,
    accessor: Accessor,
}

impl Method {
    pub fn new(slot: usize, accessor: Accessor) -> Self {
        Self { slot, accessor }
    }

    /// Returns the field as stored
    pub fn reader(slot: usize) -> Self {
        Self::new(slot, read)
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn call(&self, record: &Record) -> FieldValue {
        (self.accessor)(record, self.slot)
    }
}

fn read(record: &Record, slot: usize) -> FieldValue {
    record.slot(slot).clone()
}

/// Methods by name
#[derive(Debug, Clone, Default)]
pub struct Methods {
    table: HashMap<String, Method>,
}

impl Methods {
    /// Define or replace a method
    pub fn define(&mut self, name: impl Into<String>, method: Method) {
        self.table.insert(name.into(), method);
    }

    pub fn get(&self, name: &str) -> Option<&Method> {
        self.table.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Method names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_replaces() {
        let mut methods = Methods::default();
        assert!(methods.is_empty());

        methods.define("name", Method::reader(0));
        methods.define("name", Method::reader(2));
        methods.define("admin?", Method::reader(1));

        assert_eq!(methods.len(), 2);
        assert_eq!(methods.get("name").map(Method::slot), Some(2));
        assert_eq!(methods.names(), vec!["admin?", "name"]);
        assert!(!methods.contains("age"));
    }
}
