//! Table reconciliation.
//!
//! Stores without row-level update take a new snapshot by diffing it against
//! the current one: rows only in the new snapshot are inserted, rows only in
//! the old snapshot are deleted. Rows are compared whole, so a changed row
//! shows up as one delete plus one insert.
//!
//! Cassandra stamps every statement of a batch with the same write time, and
//! a tombstone beats a live cell at equal time. A delete and an insert of the
//! same primary key in one CQL batch would therefore leave the row deleted.
//! For CQL the delete of a replaced row is dropped; the insert overwrites it.

use datacom_core::{Record, Result};

use crate::builder::{build_row_delete, build_row_insert, Dialect};
use crate::matcher::{matches, records_equal};
use crate::statement::Statement;

/// Rows to insert and delete to turn one snapshot into another.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reconciliation {
    /// Rows present only in the new snapshot
    pub to_insert: Vec<Record>,
    /// Rows present only in the old snapshot
    pub to_delete: Vec<Record>,
    /// Columns identifying a row for deletes
    pub key_columns: Vec<String>,
}

impl Reconciliation {
    /// Total number of rows changed.
    pub fn affected(&self) -> u64 {
        (self.to_insert.len() + self.to_delete.len()) as u64
    }

    /// True when the snapshots already agree.
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_delete.is_empty()
    }

    /// Statements applying the diff: deletes first, then inserts.
    ///
    /// Inserts bind every column; deletes bind only the key columns. A
    /// non-empty delete side without key columns fails `MissingKeys`. Under
    /// CQL a delete whose key is re-inserted is left out.
    pub fn statements<S: AsRef<str>>(
        &self,
        dialect: &Dialect,
        destination: &str,
        columns: &[S],
    ) -> Result<Vec<Statement>> {
        let mut out = Vec::with_capacity(self.to_insert.len() + self.to_delete.len());
        for row in &self.to_delete {
            if self.overwritten_by_insert(dialect, row)? {
                continue;
            }
            out.push(build_row_delete(dialect, destination, &self.key_columns, row)?);
        }
        for row in &self.to_insert {
            out.push(build_row_insert(dialect, destination, columns, row)?);
        }
        Ok(out)
    }

    fn overwritten_by_insert(&self, dialect: &Dialect, row: &Record) -> Result<bool> {
        if !matches!(dialect, Dialect::Cql { .. }) || self.key_columns.is_empty() {
            return Ok(false);
        }
        for inserted in &self.to_insert {
            if matches(inserted, &self.key_columns, row)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Diff two snapshots by full-row set difference.
pub fn reconcile<S: AsRef<str>>(old: &[Record], new: &[Record], keys: &[S]) -> Reconciliation {
    let absent_from = |side: &[Record], row: &Record| !side.iter().any(|r| records_equal(r, row));
    Reconciliation {
        to_insert: new.iter().filter(|r| absent_from(old, *r)).cloned().collect(),
        to_delete: old.iter().filter(|r| absent_from(new, *r)).cloned().collect(),
        key_columns: keys.iter().map(|k| k.as_ref().to_string()).collect(),
    }
}
