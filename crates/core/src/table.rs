//! Tabular results and snapshots.

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::schema::{Attribute, Schema};
use crate::value::ValueKind;

/// Materialized rows with column metadata.
///
/// Read from a store, compared, and discarded. Serializes to JSON so a
/// key-value store can hold a whole table under one key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Columns in order
    pub columns: Vec<Attribute>,
    /// Columns identifying a row
    #[serde(default)]
    pub key_columns: Vec<String>,
    /// Rows in order
    pub rows: Vec<Record>,
}

impl Table {
    /// Empty table with the given untyped columns.
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|c| Attribute::new(c.as_ref(), ValueKind::Any))
                .collect(),
            key_columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Empty table shaped like `schema`.
    pub fn with_schema(schema: &Schema) -> Self {
        Self {
            columns: schema.attributes().to_vec(),
            key_columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Builder: set the key columns.
    pub fn with_key_columns<S: AsRef<str>>(mut self, keys: &[S]) -> Self {
        self.key_columns = keys.iter().map(|k| k.as_ref().to_string()).collect();
        self
    }

    /// Append a row, reordered to the column order.
    pub fn push_row(&mut self, row: Record) {
        let names = self.column_names();
        if names.is_empty() {
            self.rows.push(row);
        } else {
            self.rows.push(row.project(&names));
        }
    }

    /// Build a table from records, taking columns from the first record.
    pub fn from_records(rows: Vec<Record>) -> Self {
        let columns = rows
            .first()
            .map(|r| r.names().map(|n| Attribute::new(n, ValueKind::Any)).collect())
            .unwrap_or_default();
        Self {
            columns,
            key_columns: Vec::new(),
            rows,
        }
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Rows in order
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
