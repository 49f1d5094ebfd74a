//! Structured writes.

use datacom_core::{Entity, Record};

use super::DataClient;
use crate::{Command, Error, Output, Result};

fn records<T: Entity>(items: &[T]) -> Vec<Record> {
    items.iter().map(Entity::to_record).collect()
}

fn owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

impl DataClient {
    // =========================================================================
    // Single record
    // =========================================================================

    /// Insert one record into `destination`.
    ///
    /// Returns the affected count.
    pub fn insert<T: Entity>(&mut self, item: &T, destination: &str) -> Result<u64> {
        self.insert_many(std::slice::from_ref(item), destination)
    }

    /// Update the records of `destination` matching `item` on `keys`.
    ///
    /// On key-value stores a miss appends `item`; relational and Cassandra
    /// stores update nothing.
    pub fn update<T: Entity>(&mut self, item: &T, destination: &str, keys: &[&str]) -> Result<u64> {
        self.update_many(std::slice::from_ref(item), destination, keys)
    }

    /// Delete the records of `destination` matching `item` on `keys`.
    pub fn delete<T: Entity>(&mut self, item: &T, destination: &str, keys: &[&str]) -> Result<u64> {
        self.delete_many(std::slice::from_ref(item), destination, keys)
    }

    // =========================================================================
    // Record lists
    // =========================================================================

    /// Insert every item in one all-or-nothing operation.
    ///
    /// An empty slice fails `NullRecord`.
    pub fn insert_many<T: Entity>(&mut self, items: &[T], destination: &str) -> Result<u64> {
        match self.execute(Command::Insert {
            destination: destination.to_string(),
            schema: T::schema().clone(),
            records: records(items),
        })? {
            Output::Count(n) => Ok(n),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Insert".into(),
            }),
        }
    }

    /// Update every item in one all-or-nothing operation.
    pub fn update_many<T: Entity>(
        &mut self,
        items: &[T],
        destination: &str,
        keys: &[&str],
    ) -> Result<u64> {
        match self.execute(Command::Update {
            destination: destination.to_string(),
            schema: T::schema().clone(),
            records: records(items),
            keys: owned(keys),
        })? {
            Output::Count(n) => Ok(n),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Update".into(),
            }),
        }
    }

    /// Delete every item in one all-or-nothing operation.
    pub fn delete_many<T: Entity>(
        &mut self,
        items: &[T],
        destination: &str,
        keys: &[&str],
    ) -> Result<u64> {
        match self.execute(Command::Delete {
            destination: destination.to_string(),
            schema: T::schema().clone(),
            records: records(items),
            keys: owned(keys),
        })? {
            Output::Count(n) => Ok(n),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Delete".into(),
            }),
        }
    }
}
