//! Records: ordered attribute name → value maps.
//!
//! A [`Record`] is the runtime shape of one row, list entry or object. Field
//! order is the order attributes were declared or inserted; it drives column
//! order in generated statements. Equality ignores order: two records are
//! equal when they hold the same attribute names with equal values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::Value;

static NULL: Value = Value::Null;

/// A single named attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Attribute name
    pub name: String,
    /// Attribute value
    pub value: Value,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered set of named attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set an attribute, replacing an existing value in place or appending.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(Field { name, value }),
        }
    }

    /// Get an attribute value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Get an attribute value, treating a missing attribute as `Null`.
    pub fn value_or_null(&self, name: &str) -> &Value {
        self.get(name).unwrap_or(&NULL)
    }

    /// Whether the record declares `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Attribute names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Fields in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Consume into the ordered fields.
    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no attributes.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// New record holding only `names`, in the given order.
    ///
    /// Names missing from this record are carried as `Null`.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> Record {
        names
            .iter()
            .map(|n| Field::new(n.as_ref(), self.value_or_null(n.as_ref()).clone()))
            .collect()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|f| other.get(&f.name) == Some(&f.value))
    }
}

impl FromIterator<Field> for Record {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut record = Record::new();
        for field in iter {
            record.set(field.name, field.value);
        }
        record
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().map(|(k, v)| Field::new(k, v)).collect()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", field.name, field.value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut r = Record::new().with("id", 1i64).with("name", "a");
        r.set("id", 2i64);
        let names: Vec<_> = r.names().collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(r.get("id"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_missing_attribute_reads_as_null() {
        let r = Record::new().with("id", 1i64);
        assert_eq!(r.value_or_null("other"), &Value::Null);
        assert!(r.get("other").is_none());
    }

    #[test]
    fn test_project_keeps_requested_order() {
        let r = Record::new().with("a", 1i64).with("b", 2i64).with("c", 3i64);
        let p = r.project(&["c", "a", "z"]);
        let names: Vec<_> = p.names().collect();
        assert_eq!(names, vec!["c", "a", "z"]);
        assert_eq!(p.get("z"), Some(&Value::Null));
    }

    #[test]
    fn test_equality_requires_same_attribute_set() {
        let a = Record::new().with("id", 1i64);
        let b = Record::new().with("id", 1i64).with("x", Value::Null);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let r = Record::new().with("id", 1i64).with("name", "a");
        assert_eq!(r.to_string(), "{id:1,name:a}");
    }

    fn fields() -> impl Strategy<Value = Vec<(String, i64)>> {
        prop::collection::btree_map("[a-e]", any::<i64>(), 0..5)
            .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_equality_ignores_field_order(pairs in fields()) {
            let forward: Record = pairs.iter().cloned().collect();
            let backward: Record = pairs.iter().rev().cloned().collect();
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn prop_project_onto_own_names_is_identity(pairs in fields()) {
            let r: Record = pairs.into_iter().collect();
            let names: Vec<String> = r.names().map(str::to_string).collect();
            prop_assert_eq!(r.project(&names), r);
        }
    }
}
