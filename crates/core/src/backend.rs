//! Backend kinds and the operation capability table.
//!
//! Every store DataCom talks to is one [`BackendKind`]. Each kind belongs to a
//! [`StoreFamily`], which decides how records become native commands, and
//! advertises the [`OperationKind`]s it implements through
//! [`BackendKind::supports`]. The table is exhaustive: the dispatcher consults
//! it before touching a connection and fails unsupported combinations with
//! `UnsupportedOperation`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Supported data stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Microsoft SQL Server
    SqlServer,
    /// Any ODBC data source
    Odbc,
    /// OLE DB provider (Access, Excel, remote providers)
    OleDb,
    /// SQLite 3
    Sqlite,
    /// PostgreSQL
    PostgreSql,
    /// MySQL / MariaDB
    MySql,
    /// Redis
    Redis,
    /// Apache Cassandra (CQL)
    Cassandra,
    /// etcd v3
    Etcd,
}

/// How a backend stores rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreFamily {
    /// SQL engines with transactions and `WHERE`
    Relational,
    /// Key-value stores holding JSON-encoded lists under a key
    KeyValueList,
    /// Wide-column stores addressed with CQL
    WideColumn,
}

/// Abstract operations routed by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Insert records
    Insert,
    /// Update records matched by key
    Update,
    /// Delete records matched by key
    Delete,
    /// Read a tabular result
    GetTable,
    /// Reconcile a tabular result back into the store
    PutTable,
    /// Read a single scalar
    GetScalar,
    /// Read a list of records
    GetList,
    /// Execute a raw non-query statement
    ExecuteRaw,
    /// Execute a statement batch in one transaction
    ExecuteTransaction,
    /// Read the string stored at a key
    Get,
    /// Write a string at a key
    Set,
    /// Read one list entry by position
    FetchIndex,
    /// Read a range of list entries
    FetchRange,
    /// Read rows matching equality predicates
    FetchWhere,
    /// Connectivity check
    Ping,
}

impl OperationKind {
    /// Stable name used in errors and logs
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::GetTable => "get_table",
            OperationKind::PutTable => "put_table",
            OperationKind::GetScalar => "get_scalar",
            OperationKind::GetList => "get_list",
            OperationKind::ExecuteRaw => "execute_raw",
            OperationKind::ExecuteTransaction => "execute_transaction",
            OperationKind::Get => "get",
            OperationKind::Set => "set",
            OperationKind::FetchIndex => "fetch_index",
            OperationKind::FetchRange => "fetch_range",
            OperationKind::FetchWhere => "fetch_where",
            OperationKind::Ping => "ping",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl BackendKind {
    /// Every backend, in declaration order
    pub const ALL: [BackendKind; 9] = [
        BackendKind::SqlServer,
        BackendKind::Odbc,
        BackendKind::OleDb,
        BackendKind::Sqlite,
        BackendKind::PostgreSql,
        BackendKind::MySql,
        BackendKind::Redis,
        BackendKind::Cassandra,
        BackendKind::Etcd,
    ];

    /// Stable lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::SqlServer => "sqlserver",
            BackendKind::Odbc => "odbc",
            BackendKind::OleDb => "oledb",
            BackendKind::Sqlite => "sqlite",
            BackendKind::PostgreSql => "postgresql",
            BackendKind::MySql => "mysql",
            BackendKind::Redis => "redis",
            BackendKind::Cassandra => "cassandra",
            BackendKind::Etcd => "etcd",
        }
    }

    /// Storage family of this backend
    pub fn family(&self) -> StoreFamily {
        match self {
            BackendKind::SqlServer
            | BackendKind::Odbc
            | BackendKind::OleDb
            | BackendKind::Sqlite
            | BackendKind::PostgreSql
            | BackendKind::MySql => StoreFamily::Relational,
            BackendKind::Redis | BackendKind::Etcd => StoreFamily::KeyValueList,
            BackendKind::Cassandra => StoreFamily::WideColumn,
        }
    }

    /// Whether this backend implements `op`.
    pub fn supports(&self, op: OperationKind) -> bool {
        use OperationKind::*;
        match (self.family(), op) {
            (_, Insert | Update | Delete | GetTable | PutTable | Ping) => true,

            (StoreFamily::Relational, GetScalar | GetList | ExecuteRaw | ExecuteTransaction) => {
                true
            }
            (StoreFamily::Relational, Get | Set | FetchIndex | FetchRange | FetchWhere) => false,

            (StoreFamily::KeyValueList, Get | Set | FetchIndex | FetchRange) => true,
            (
                StoreFamily::KeyValueList,
                GetScalar | GetList | ExecuteRaw | ExecuteTransaction | FetchWhere,
            ) => false,

            // Cassandra has no ordered-list semantics; FetchRange is limited to
            // the full range by the handler.
            (StoreFamily::WideColumn, Get | Set | FetchRange | FetchWhere) => true,
            (
                StoreFamily::WideColumn,
                GetScalar | GetList | ExecuteRaw | ExecuteTransaction | FetchIndex,
            ) => false,
        }
    }

    /// Fail with `UnsupportedOperation` unless `op` is supported.
    pub fn require(&self, op: OperationKind) -> Result<(), Error> {
        if self.supports(op) {
            Ok(())
        } else {
            Err(Error::UnsupportedOperation {
                backend: self.name().to_string(),
                operation: op.name().to_string(),
            })
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlserver" | "mssql" | "sql" => Ok(BackendKind::SqlServer),
            "odbc" => Ok(BackendKind::Odbc),
            "oledb" | "ole" => Ok(BackendKind::OleDb),
            "sqlite" | "sqlite3" => Ok(BackendKind::Sqlite),
            "postgresql" | "postgres" | "pgsql" | "pg" => Ok(BackendKind::PostgreSql),
            "mysql" | "mariadb" => Ok(BackendKind::MySql),
            "redis" => Ok(BackendKind::Redis),
            "cassandra" | "cql" => Ok(BackendKind::Cassandra),
            "etcd" => Ok(BackendKind::Etcd),
            other => Err(Error::Config {
                reason: format!("unknown backend '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str_aliases() {
        assert_eq!("MSSQL".parse::<BackendKind>().unwrap(), BackendKind::SqlServer);
        assert_eq!("pgsql".parse::<BackendKind>().unwrap(), BackendKind::PostgreSql);
        assert_eq!("Sqlite3".parse::<BackendKind>().unwrap(), BackendKind::Sqlite);
        assert_eq!(" etcd ".parse::<BackendKind>().unwrap(), BackendKind::Etcd);
        assert!(matches!(
            "oracle".parse::<BackendKind>(),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_name_round_trips_through_from_str() {
        for backend in BackendKind::ALL {
            assert_eq!(backend.name().parse::<BackendKind>().unwrap(), backend);
        }
    }

    #[test]
    fn test_structured_writes_supported_everywhere() {
        for backend in BackendKind::ALL {
            for op in [
                OperationKind::Insert,
                OperationKind::Update,
                OperationKind::Delete,
                OperationKind::GetTable,
                OperationKind::PutTable,
            ] {
                assert!(backend.supports(op), "{} should support {}", backend, op);
            }
        }
    }

    #[test]
    fn test_cassandra_has_no_index_fetch() {
        let err = BackendKind::Cassandra
            .require(OperationKind::FetchIndex)
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedOperation {
                backend: "cassandra".into(),
                operation: "fetch_index".into(),
            }
        );
    }

    #[test]
    fn test_relational_rejects_key_value_operations() {
        assert!(!BackendKind::MySql.supports(OperationKind::Get));
        assert!(!BackendKind::PostgreSql.supports(OperationKind::FetchRange));
        assert!(BackendKind::SqlServer.supports(OperationKind::ExecuteTransaction));
    }

    #[test]
    fn test_key_value_rejects_sql_reads() {
        assert!(!BackendKind::Redis.supports(OperationKind::GetScalar));
        assert!(!BackendKind::Etcd.supports(OperationKind::ExecuteRaw));
        assert!(BackendKind::Etcd.supports(OperationKind::FetchIndex));
    }
}
