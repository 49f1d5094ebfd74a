//! Record descriptors.
//!
//! A [`Schema`] is the ordered attribute list of one record type. It replaces
//! runtime introspection: each [`Entity`](crate::Entity) supplies its schema
//! once and every command, match and decode uses it.
//!
//! A schema with zero attributes is a *scalar schema*. Values of such types
//! are opaque single values; they may be appended to key-value lists but
//! cannot take part in structured (keyed) operations.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::{Field, Record};
use crate::value::{Value, ValueKind};

/// Attribute name used when a scalar value is carried inside a record.
pub const SCALAR_ATTRIBUTE: &str = "$value";

/// One declared attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Declared kind
    pub kind: ValueKind,
}

impl Attribute {
    /// Create a new attribute.
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered attribute list of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    attributes: Vec<Attribute>,
}

impl Schema {
    /// Empty schema. Add attributes with [`Schema::attribute`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Scalar schema (zero attributes).
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name)
    }

    /// Builder: declare an attribute. Redeclaring a name replaces its kind.
    pub fn attribute(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        let name = name.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.kind = kind,
            None => self.attributes.push(Attribute::new(name, kind)),
        }
        self
    }

    /// Derive an untyped schema from a record's attribute names.
    pub fn of(name: impl Into<String>, record: &Record) -> Self {
        let mut schema = Self::new(name);
        for n in record.names() {
            schema = schema.attribute(n, ValueKind::Any);
        }
        schema
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attribute names in order
    pub fn names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Look up an attribute
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Whether the schema declares `name`
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// True for zero-attribute schemas
    pub fn is_scalar(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Fail with `InvalidSchema` if this is a scalar schema.
    pub fn check_structural(&self, operation: &str) -> Result<()> {
        if self.is_scalar() {
            return Err(Error::InvalidSchema {
                schema: self.name.clone(),
                reason: format!("{} requires a type with at least one attribute", operation),
            });
        }
        Ok(())
    }

    /// Validate a key set against this schema.
    ///
    /// Empty sets fail `MissingKeys`; names the schema does not declare fail
    /// `InvalidKeySet`; keys declared as `Array` or `Record` fail `InvalidSchema`.
    pub fn check_keys<S: AsRef<str>>(&self, keys: &[S], operation: &str) -> Result<()> {
        if keys.is_empty() {
            return Err(Error::MissingKeys {
                operation: operation.to_string(),
            });
        }
        for key in keys {
            let key = key.as_ref();
            let attr = self.get(key).ok_or_else(|| Error::InvalidKeySet {
                key: key.to_string(),
                schema: self.name.clone(),
            })?;
            if !attr.kind.is_key_eligible() {
                return Err(Error::InvalidSchema {
                    schema: self.name.clone(),
                    reason: format!("key attribute '{}' has non-scalar kind {}", key, attr.kind),
                });
            }
        }
        Ok(())
    }

    /// Values of `record` in attribute order; missing attributes read as `Null`.
    pub fn values_of<'a>(&self, record: &'a Record) -> Vec<&'a Value> {
        self.attributes
            .iter()
            .map(|a| record.value_or_null(&a.name))
            .collect()
    }

    /// Reorder `record` to attribute order.
    ///
    /// Undeclared fields are dropped and missing ones become `Null`.
    pub fn conform(&self, record: &Record) -> Record {
        self.attributes
            .iter()
            .map(|a| Field::new(a.name.clone(), record.value_or_null(&a.name).clone()))
            .collect()
    }
}
