//! Raw statements and transactions.

use datacom_engine::{Batch, Statement};

use super::DataClient;
use crate::{Command, Error, Output, Result};

impl DataClient {
    /// Execute one non-query statement.
    ///
    /// Returns the affected row count reported by the driver.
    pub fn execute_raw(&mut self, statement: impl Into<Statement>) -> Result<u64> {
        match self.execute(Command::ExecuteRaw {
            statement: statement.into(),
        })? {
            Output::Count(n) => Ok(n),
            _ => Err(Error::Internal {
                reason: "Unexpected output for ExecuteRaw".into(),
            }),
        }
    }

    /// Execute a batch in one transaction.
    ///
    /// Any failing statement or rejecting hook rolls the whole batch back.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let batch = Batch::new()
    ///     .push(Statement::new("UPDATE stock SET qty=qty-1 WHERE id=@id").bind("id", 7))
    ///     .after(|affected| if affected == 1 { Ok(()) } else { Err("no stock row".into()) })
    ///     .push(Statement::new("INSERT INTO orders (item) VALUES (@id)").bind("id", 7));
    /// client.execute_transaction(batch)?;
    /// ```
    pub fn execute_transaction(&mut self, batch: Batch) -> Result<u64> {
        match self.execute(Command::ExecuteTransaction { batch })? {
            Output::Count(n) => Ok(n),
            _ => Err(Error::Internal {
                reason: "Unexpected output for ExecuteTransaction".into(),
            }),
        }
    }
}
