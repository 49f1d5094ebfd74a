//! Key-value and fetch operations.

use datacom_core::Entity;
use datacom_engine::Param;

use super::DataClient;
use crate::{Command, Error, Output, Result};

impl DataClient {
    // =========================================================================
    // Plain values
    // =========================================================================

    /// Get the string stored at `key`.
    ///
    /// On Cassandra `key` is a table and the rows come back as a JSON array.
    pub fn get(&mut self, key: &str) -> Result<Option<String>> {
        match self.execute(Command::Get {
            key: key.to_string(),
        })? {
            Output::Text(text) => Ok(text),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Get".into(),
            }),
        }
    }

    /// Store `value` at `key`.
    ///
    /// On Cassandra `value` is a JSON array of rows inserted into table `key`;
    /// the count is the number of rows.
    pub fn set(&mut self, key: &str, value: &str) -> Result<u64> {
        match self.execute(Command::Set {
            key: key.to_string(),
            value: value.to_string(),
        })? {
            Output::Count(n) => Ok(n),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Set".into(),
            }),
        }
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Fetch the list entry at `index`; negative indices count from the tail.
    pub fn fetch<T: Entity>(&mut self, key: &str, index: i64) -> Result<Option<T>> {
        match self.execute(Command::FetchIndex {
            key: key.to_string(),
            schema: T::schema().clone(),
            index,
        })? {
            Output::MaybeRecord(Some(record)) => Ok(Some(T::from_record(&record)?)),
            Output::MaybeRecord(None) => Ok(None),
            _ => Err(Error::Internal {
                reason: "Unexpected output for FetchIndex".into(),
            }),
        }
    }

    /// Fetch list entries `start..=end`; `0, -1` is the whole list.
    pub fn fetch_range<T: Entity>(&mut self, key: &str, start: i64, end: i64) -> Result<Vec<T>> {
        match self.execute(Command::FetchRange {
            key: key.to_string(),
            schema: T::schema().clone(),
            start,
            end,
        })? {
            Output::Records(rows) => rows.iter().map(T::from_record).collect(),
            _ => Err(Error::Internal {
                reason: "Unexpected output for FetchRange".into(),
            }),
        }
    }

    /// Fetch rows of `table` whose columns equal every filter parameter.
    pub fn fetch_where<T: Entity>(&mut self, table: &str, filter: Vec<Param>) -> Result<Vec<T>> {
        match self.execute(Command::FetchWhere {
            table: table.to_string(),
            schema: T::schema().clone(),
            filter,
        })? {
            Output::Records(rows) => rows.iter().map(T::from_record).collect(),
            _ => Err(Error::Internal {
                reason: "Unexpected output for FetchWhere".into(),
            }),
        }
    }

    // =========================================================================
    // Connection
    // =========================================================================

    /// Open and close the connection; returns the library version.
    pub fn ping(&mut self) -> Result<String> {
        match self.execute(Command::Ping)? {
            Output::Pong { version } => Ok(version),
            _ => Err(Error::Internal {
                reason: "Unexpected output for Ping".into(),
            }),
        }
    }
}
