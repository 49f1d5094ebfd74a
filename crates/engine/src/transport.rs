//! Connection and transport contracts.
//!
//! Physical drivers live outside this crate. They plug in by implementing
//! [`Connection`] plus exactly one role trait:
//!
//! | Role | Trait | Backends |
//! |------|-------|----------|
//! | Relational | [`RelationalTransport`] | SQL Server, ODBC, OLE DB, SQLite, PostgreSQL, MySQL |
//! | Key-value list | [`ListTransport`] | Redis, Etcd |
//! | Wide column | [`CqlTransport`] | Cassandra |
//!
//! The role accessors on `Connection` are the capability feature-test: the
//! dispatcher asks for the role it needs and fails `UnsupportedOperation` when
//! the connection does not provide it.

use datacom_core::{BackendKind, Error, Result, Table, Value};
use tracing::warn;

use crate::statement::Statement;

/// A connection to one backend, owned by one in-flight operation.
pub trait Connection: Send {
    /// Backend this connection talks to
    fn backend(&self) -> BackendKind;

    /// Acquire the physical connection.
    fn open(&mut self) -> Result<()>;

    /// Release the physical connection.
    fn close(&mut self) -> Result<()>;

    /// Relational role, if implemented
    fn as_relational(&mut self) -> Option<&mut dyn RelationalTransport> {
        None
    }

    /// Key-value list role, if implemented
    fn as_list(&mut self) -> Option<&mut dyn ListTransport> {
        None
    }

    /// CQL role, if implemented
    fn as_cql(&mut self) -> Option<&mut dyn CqlTransport> {
        None
    }
}

/// Relational engine primitives.
pub trait RelationalTransport {
    /// Start a transaction.
    fn begin(&mut self) -> Result<()>;

    /// Commit the open transaction.
    fn commit(&mut self) -> Result<()>;

    /// Roll back the open transaction.
    fn rollback(&mut self) -> Result<()>;

    /// Execute a statement, returning rows affected.
    fn execute_non_query(&mut self, statement: &Statement) -> Result<u64>;

    /// Execute a query, returning the first column of the first row.
    fn execute_scalar(&mut self, statement: &Statement) -> Result<Value>;

    /// Execute a query, returning all rows.
    fn execute_reader(&mut self, statement: &Statement) -> Result<Table>;
}

/// Key-value primitives (Redis, Etcd).
pub trait ListTransport {
    /// String stored at `key`.
    fn get(&mut self, key: &str) -> Result<Option<String>>;

    /// Store a string at `key`.
    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    /// Entries `start..=stop` of the list at `key`.
    ///
    /// Negative indices count from the tail (`-1` is the last entry). Out of
    /// range bounds are clamped; an empty or missing list yields nothing.
    fn list_range(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;

    /// Replace the whole list at `key`.
    fn list_set(&mut self, key: &str, entries: &[String]) -> Result<()>;
}

/// CQL primitives (Cassandra).
pub trait CqlTransport {
    /// Keyspace statements are qualified with.
    fn keyspace(&self) -> &str;

    /// Execute a statement.
    fn execute(&mut self, statement: &Statement) -> Result<()>;

    /// Execute a query, returning all rows.
    fn query(&mut self, statement: &Statement) -> Result<Table>;
}

/// Run `f` between `open` and `close`.
///
/// The connection is closed on every exit path. A close failure after `f`
/// failed is logged and the original error is returned.
pub fn with_connection<T, F>(conn: &mut dyn Connection, f: F) -> Result<T>
where
    F: FnOnce(&mut dyn Connection) -> Result<T>,
{
    conn.open()?;
    let result = f(&mut *conn);
    let closed = conn.close();
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(backend = %conn.backend(), error = %close_err, "close failed after error");
            Err(err)
        }
    }
}

/// Resolve inclusive list bounds against a list of `len` entries.
///
/// Returns the half-open index range to read, or `None` when empty.
pub fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = i64::try_from(len).ok()?;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize + 1))
}

/// Fail `UnsupportedOperation` for a missing role.
pub(crate) fn missing_role(backend: BackendKind, role: &str) -> Error {
    Error::UnsupportedOperation {
        backend: backend.to_string(),
        operation: role.to_string(),
    }
}

/// Relational role of `conn`, or `UnsupportedOperation`.
pub fn relational(conn: &mut dyn Connection) -> Result<&mut dyn RelationalTransport> {
    let backend = conn.backend();
    conn.as_relational()
        .ok_or_else(|| missing_role(backend, "relational transport"))
}

/// List role of `conn`, or `UnsupportedOperation`.
pub fn list(conn: &mut dyn Connection) -> Result<&mut dyn ListTransport> {
    let backend = conn.backend();
    conn.as_list()
        .ok_or_else(|| missing_role(backend, "list transport"))
}

/// CQL role of `conn`, or `UnsupportedOperation`.
pub fn cql(conn: &mut dyn Connection) -> Result<&mut dyn CqlTransport> {
    let backend = conn.backend();
    conn.as_cql()
        .ok_or_else(|| missing_role(backend, "cql transport"))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flaky {
        opened: bool,
        fail_close: bool,
        closes: usize,
    }

    impl Connection for Flaky {
        fn backend(&self) -> BackendKind {
            BackendKind::Redis
        }

        fn open(&mut self) -> Result<()> {
            self.opened = true;
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            self.closes += 1;
            self.opened = false;
            if self.fail_close {
                Err(Error::execution("socket reset"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_resolve_range_redis_semantics() {
        assert_eq!(resolve_range(5, 0, -1), Some((0, 5)));
        assert_eq!(resolve_range(5, 1, 2), Some((1, 3)));
        assert_eq!(resolve_range(5, -2, -1), Some((3, 5)));
        assert_eq!(resolve_range(5, 3, 100), Some((3, 5)));
        assert_eq!(resolve_range(5, -100, 0), Some((0, 1)));
        assert_eq!(resolve_range(5, 4, 2), None);
        assert_eq!(resolve_range(5, 7, 9), None);
        assert_eq!(resolve_range(0, 0, -1), None);
    }

    #[test]
    fn test_with_connection_closes_on_error() {
        let mut conn = Flaky {
            opened: false,
            fail_close: false,
            closes: 0,
        };
        let result: Result<()> = with_connection(&mut conn, |_| Err(Error::EmptyKeys));
        assert_eq!(result, Err(Error::EmptyKeys));
        assert_eq!(conn.closes, 1);
        assert!(!conn.opened);
    }

    #[test]
    fn test_close_failure_does_not_mask_original_error() {
        let mut conn = Flaky {
            opened: false,
            fail_close: true,
            closes: 0,
        };
        let result: Result<()> = with_connection(&mut conn, |_| Err(Error::EmptyKeys));
        assert_eq!(result, Err(Error::EmptyKeys));

        let result = with_connection(&mut conn, |_| Ok(1));
        assert!(matches!(result, Err(Error::ExecutionFailed { .. })));
    }

    #[test]
    fn test_missing_role_is_unsupported() {
        let mut conn = Flaky {
            opened: false,
            fail_close: false,
            closes: 0,
        };
        assert!(matches!(
            relational(&mut conn).err(),
            Some(Error::UnsupportedOperation { .. })
        ));
    }
}
