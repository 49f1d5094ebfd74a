//! Command handlers organized by store family.
//!
//! | Module | Backends | Role |
//! |--------|----------|------|
//! | `relational` | SQL Server, ODBC, OLE DB, SQLite, PostgreSQL, MySQL | `RelationalTransport` |
//! | `list` | Redis, Etcd | `ListTransport` |
//! | `wide_column` | Cassandra | `CqlTransport` |
//!
//! Each handler receives an open connection and a command the backend is
//! known to support.

pub mod list;
pub mod relational;
pub mod wide_column;

use datacom_core::{
    BackendKind, Error, OperationKind, Record, Result, Schema, Value, ValueKind, SCALAR_ATTRIBUTE,
};
use datacom_engine::{NativeCommand, Statement};

pub(crate) fn unsupported(backend: BackendKind, op: OperationKind) -> Error {
    Error::UnsupportedOperation {
        backend: backend.to_string(),
        operation: op.to_string(),
    }
}

/// Unwrap built commands for a statement store; a list mutation is a bug.
pub(crate) fn statements_only(commands: Vec<NativeCommand>) -> Result<Vec<Statement>> {
    commands
        .into_iter()
        .map(|c| match c {
            NativeCommand::Statement(s) => Ok(s),
            NativeCommand::List(m) => Err(Error::Internal {
                reason: format!("statement store received list mutation '{}'", m),
            }),
        })
        .collect()
}

/// Coerce a value read from a driver to the declared kind.
fn coerce(value: &Value, kind: ValueKind, attribute: &str) -> Result<Value> {
    if kind.accepts(value) {
        return Ok(value.clone());
    }
    match (kind, value) {
        (ValueKind::Float, Value::Int(i)) => Ok(Value::Float(*i as f64)),
        (ValueKind::DateTime, Value::String(s)) => chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| Value::DateTime(dt.with_timezone(&chrono::Utc)))
            .map_err(|_| mismatch(value, kind, attribute)),
        _ => Err(mismatch(value, kind, attribute)),
    }
}

fn mismatch(value: &Value, kind: ValueKind, attribute: &str) -> Error {
    Error::TypeMismatch {
        attribute: attribute.to_string(),
        expected: kind.name().to_string(),
        actual: value.type_name().to_string(),
    }
}

/// Shape a row read from a table into `schema`.
///
/// Columns match attributes by name, ignoring ASCII case when there is no
/// exact match. Undeclared columns are dropped. A scalar schema takes the
/// first column.
pub(crate) fn shape_row(schema: &Schema, row: &Record) -> Result<Record> {
    if schema.is_scalar() {
        let value = row.fields().first().map(|f| f.value.clone()).unwrap_or(Value::Null);
        return Ok(Record::new().with(SCALAR_ATTRIBUTE, value));
    }
    let mut shaped = Record::new();
    for attr in schema.attributes() {
        let value = row
            .get(&attr.name)
            .or_else(|| {
                row.fields()
                    .iter()
                    .find(|f| f.name.eq_ignore_ascii_case(&attr.name))
                    .map(|f| &f.value)
            })
            .unwrap_or_else(|| row.value_or_null(&attr.name));
        shaped.set(attr.name.clone(), coerce(value, attr.kind, &attr.name)?);
    }
    Ok(shaped)
}

/// Shape every row.
pub(crate) fn shape_rows(schema: &Schema, rows: &[Record]) -> Result<Vec<Record>> {
    rows.iter().map(|r| shape_row(schema, r)).collect()
}

/// Columns to synchronize: declared columns, else those of the first row.
pub(crate) fn sync_columns(table: &datacom_core::Table) -> Vec<String> {
    let declared = table.column_names();
    if !declared.is_empty() {
        return declared;
    }
    table
        .rows
        .first()
        .map(|r| r.names().map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new("Reading")
            .attribute("id", ValueKind::Int)
            .attribute("value", ValueKind::Float)
            .attribute("label", ValueKind::String)
    }

    #[test]
    fn test_shape_row_matches_case_insensitively() {
        let row = Record::new()
            .with("ID", 3i64)
            .with("Value", 2i64)
            .with("other", true);
        let shaped = shape_row(&schema(), &row).unwrap();
        assert_eq!(shaped.get("id"), Some(&Value::Int(3)));
        assert_eq!(shaped.get("value"), Some(&Value::Float(2.0)));
        assert_eq!(shaped.get("label"), Some(&Value::Null));
        assert!(!shaped.contains("other"));
    }

    #[test]
    fn test_shape_row_rejects_wrong_kind() {
        let row = Record::new().with("id", "three");
        assert!(matches!(
            shape_row(&schema(), &row),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_statements_only_rejects_list_mutations() {
        let statement = NativeCommand::Statement(Statement::new("DELETE FROM t"));
        let mutation = NativeCommand::List(datacom_engine::ListMutation {
            key: "t".to_string(),
            payload: "{}".to_string(),
            op: datacom_engine::WriteKind::Insert,
            keys: vec![],
        });
        assert_eq!(statements_only(vec![statement.clone()]).unwrap().len(), 1);
        assert!(matches!(
            statements_only(vec![statement, mutation]),
            Err(Error::Internal { .. })
        ));
    }

    #[test]
    fn test_scalar_schema_takes_first_column() {
        let row = Record::new().with("name", "a").with("x", 1i64);
        let shaped = shape_row(&Schema::scalar("String"), &row).unwrap();
        assert_eq!(shaped.get(SCALAR_ATTRIBUTE), Some(&Value::String("a".into())));
    }
}
