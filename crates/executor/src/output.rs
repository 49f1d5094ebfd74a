//! Output enum for command execution results.
//!
//! Every command produces exactly one output variant. Outputs own their data
//! and never reference the connection they were read from.

use datacom_core::{Record, Table, Value};
use serde::{Deserialize, Serialize};

/// Successful command execution results.
///
/// # Example
///
/// ```text
/// match executor.execute(&mut conn, Command::Get { key: "k".into() })? {
///     Output::Text(Some(s)) => println!("found {}", s),
///     Output::Text(None) => println!("missing"),
///     _ => unreachable!("Get always returns Text"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// Rows or entries affected
    Count(u64),

    /// Single scalar
    Scalar(Value),

    /// Ordered records
    Records(Vec<Record>),

    /// Tabular result, `None` when the key holds nothing
    Table(Option<Table>),

    /// String value, `None` when the key holds nothing
    Text(Option<String>),

    /// Single record, `None` when out of range
    MaybeRecord(Option<Record>),

    /// Connectivity check result
    Pong {
        /// Library version
        version: String,
    },
}
