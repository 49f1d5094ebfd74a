//! Tabular and relational reads.

use datacom_core::{Entity, Table, Value};
use datacom_engine::Statement;

use super::DataClient;
use crate::command::TableSource;
use crate::{Command, Error, Output, Result};

impl DataClient {
    /// Read a table from a query or a key.
    ///
    /// Returns `None` when a key-value store holds nothing at the key.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let by_query = client.get_table(Statement::new("SELECT * FROM people"))?;
    /// let by_key = client.get_table("people")?;
    /// ```
    pub fn get_table(&mut self, source: impl Into<TableSource>) -> Result<Option<Table>> {
        match self.execute(Command::GetTable {
            source: source.into(),
        })? {
            Output::Table(table) => Ok(table),
            _ => Err(Error::Internal {
                reason: "Unexpected output for GetTable".into(),
            }),
        }
    }

    /// Reconcile `destination` to the contents of `table`.
    ///
    /// Rows are matched on `table.key_columns`. Returns inserted plus
    /// deleted rows.
    pub fn put_table(&mut self, destination: &str, table: Table) -> Result<u64> {
        match self.execute(Command::PutTable {
            destination: destination.to_string(),
            table,
        })? {
            Output::Count(n) => Ok(n),
            _ => Err(Error::Internal {
                reason: "Unexpected output for PutTable".into(),
            }),
        }
    }

    /// Read a single value.
    pub fn get_scalar(&mut self, query: impl Into<Statement>) -> Result<Value> {
        match self.execute(Command::GetScalar {
            query: query.into(),
        })? {
            Output::Scalar(v) => Ok(v),
            _ => Err(Error::Internal {
                reason: "Unexpected output for GetScalar".into(),
            }),
        }
    }

    /// Read typed records.
    ///
    /// Columns map to attributes by name; undeclared columns are ignored.
    pub fn get_list<T: Entity>(&mut self, query: impl Into<Statement>) -> Result<Vec<T>> {
        match self.execute(Command::GetList {
            query: query.into(),
            schema: T::schema().clone(),
        })? {
            Output::Records(rows) => rows.iter().map(T::from_record).collect(),
            _ => Err(Error::Internal {
                reason: "Unexpected output for GetList".into(),
            }),
        }
    }
}
