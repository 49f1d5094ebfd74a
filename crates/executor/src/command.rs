//! Command enum defining all DataCom operations.
//!
//! Commands are the request values passed through the dispatcher. Every
//! operation the facade can perform is one variant carrying everything it
//! needs; nothing is shared between calls.
//!
//! Commands are:
//! - **Self-contained**: all parameters needed for execution are in the variant
//! - **Backend-neutral**: the same command runs against any backend that
//!   advertises the operation
//! - **Single-use**: `ExecuteTransaction` carries hook closures, so commands are
//!   moved into the executor rather than cloned

use datacom_core::{OperationKind, Record, Schema, Table};
use datacom_engine::{Batch, Param, Statement};

/// Where a tabular read comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// A query (relational, Cassandra)
    Query(Statement),
    /// A table name (relational, Cassandra) or store key (Redis, Etcd)
    Key(String),
}

impl From<Statement> for TableSource {
    fn from(s: Statement) -> Self {
        TableSource::Query(s)
    }
}

impl From<&str> for TableSource {
    fn from(key: &str) -> Self {
        TableSource::Key(key.to_string())
    }
}

/// A self-contained operation.
///
/// # Command Categories
///
/// | Category | Commands | Output |
/// |----------|----------|--------|
/// | Structured writes | `Insert`, `Update`, `Delete` | `Count` |
/// | Tables | `GetTable`, `PutTable` | `Table`, `Count` |
/// | Relational reads | `GetScalar`, `GetList` | `Scalar`, `Records` |
/// | Raw | `ExecuteRaw`, `ExecuteTransaction` | `Count` |
/// | Key-value | `Get`, `Set` | `Text`, `Count` |
/// | Fetch | `FetchIndex`, `FetchRange`, `FetchWhere` | `MaybeRecord`, `Records` |
/// | Connection | `Ping` | `Pong` |
#[derive(Debug)]
pub enum Command {
    // ==================== Structured writes ====================
    /// Insert records into `destination`.
    /// Returns: `Output::Count`
    Insert {
        /// Table or store key
        destination: String,
        /// Record descriptor
        schema: Schema,
        /// Records to insert
        records: Vec<Record>,
    },

    /// Update records matching on `keys`.
    /// Returns: `Output::Count`
    Update {
        /// Table or store key
        destination: String,
        /// Record descriptor
        schema: Schema,
        /// New record values
        records: Vec<Record>,
        /// Key attributes
        keys: Vec<String>,
    },

    /// Delete records matching on `keys`.
    /// Returns: `Output::Count`
    Delete {
        /// Table or store key
        destination: String,
        /// Record descriptor
        schema: Schema,
        /// Records identifying what to delete
        records: Vec<Record>,
        /// Key attributes
        keys: Vec<String>,
    },

    // ==================== Tables ====================
    /// Read a table.
    /// Returns: `Output::Table`
    GetTable {
        /// Query, table name or key
        source: TableSource,
    },

    /// Reconcile the store with `table`.
    /// Returns: `Output::Count`
    PutTable {
        /// Table or store key
        destination: String,
        /// Desired contents
        table: Table,
    },

    // ==================== Relational reads ====================
    /// First column of the first row.
    /// Returns: `Output::Scalar`
    GetScalar {
        /// Query to run
        query: Statement,
    },

    /// Rows shaped by `schema`.
    /// Returns: `Output::Records`
    GetList {
        /// Query to run
        query: Statement,
        /// Shape of each row
        schema: Schema,
    },

    // ==================== Raw ====================
    /// Execute one non-query statement.
    /// Returns: `Output::Count`
    ExecuteRaw {
        /// Statement to execute
        statement: Statement,
    },

    /// Execute a batch in one transaction.
    /// Returns: `Output::Count`
    ExecuteTransaction {
        /// Statements with hooks
        batch: Batch,
    },

    // ==================== Key-value ====================
    /// String at `key`; Cassandra returns the rows of table `key` as JSON.
    /// Returns: `Output::Text`
    Get {
        /// Store key or table name
        key: String,
    },

    /// Write a string at `key`; Cassandra inserts the JSON rows in `value`.
    /// Returns: `Output::Count`
    Set {
        /// Store key or table name
        key: String,
        /// String value or JSON rows
        value: String,
    },

    // ==================== Fetch ====================
    /// One list entry by position. Negative indices count from the tail.
    /// Returns: `Output::MaybeRecord`
    FetchIndex {
        /// Store key
        key: String,
        /// Shape of the entry
        schema: Schema,
        /// Position
        index: i64,
    },

    /// List entries `start..=end`. Cassandra supports only the full range.
    /// Returns: `Output::Records`
    FetchRange {
        /// Store key or table name
        key: String,
        /// Shape of the entries
        schema: Schema,
        /// First position
        start: i64,
        /// Last position, inclusive
        end: i64,
    },

    /// Rows of `table` whose columns equal the filter values.
    /// Returns: `Output::Records`
    FetchWhere {
        /// Table name
        table: String,
        /// Shape of the rows
        schema: Schema,
        /// Column equality predicates
        filter: Vec<Param>,
    },

    // ==================== Connection ====================
    /// Open and close the connection.
    /// Returns: `Output::Pong`
    Ping,
}

impl Command {
    /// Abstract operation kind, used for capability checks.
    pub fn operation(&self) -> OperationKind {
        match self {
            Command::Insert { .. } => OperationKind::Insert,
            Command::Update { .. } => OperationKind::Update,
            Command::Delete { .. } => OperationKind::Delete,
            Command::GetTable { .. } => OperationKind::GetTable,
            Command::PutTable { .. } => OperationKind::PutTable,
            Command::GetScalar { .. } => OperationKind::GetScalar,
            Command::GetList { .. } => OperationKind::GetList,
            Command::ExecuteRaw { .. } => OperationKind::ExecuteRaw,
            Command::ExecuteTransaction { .. } => OperationKind::ExecuteTransaction,
            Command::Get { .. } => OperationKind::Get,
            Command::Set { .. } => OperationKind::Set,
            Command::FetchIndex { .. } => OperationKind::FetchIndex,
            Command::FetchRange { .. } => OperationKind::FetchRange,
            Command::FetchWhere { .. } => OperationKind::FetchWhere,
            Command::Ping => OperationKind::Ping,
        }
    }
}
