//! Relational command handlers.
//!
//! Structured writes become one SQL statement per record, executed as one
//! transaction. `PutTable` reads the current contents, reconciles, and applies
//! the diff in one transaction.

use datacom_core::{Record, Result, Schema, Table};
use datacom_engine::transport::relational;
use datacom_engine::{
    execute_batch, reconcile, select_all, Batch, CommandBuilder, Connection, Dialect,
    RelationalBatch, RelationalTransport, Statement, WriteKind,
};

use super::{shape_rows, statements_only, sync_columns, unsupported};
use crate::command::TableSource;
use crate::{Command, Output};

/// Handle a command against a relational backend.
pub fn handle(conn: &mut dyn Connection, cmd: Command) -> Result<Output> {
    let backend = conn.backend();
    let op = cmd.operation();
    let sql = relational(conn)?;
    match cmd {
        Command::Insert {
            destination,
            schema,
            records,
        } => write(sql, WriteKind::Insert, &schema, &records, &destination, &[]),
        Command::Update {
            destination,
            schema,
            records,
            keys,
        } => write(sql, WriteKind::Update, &schema, &records, &destination, &keys),
        Command::Delete {
            destination,
            schema,
            records,
            keys,
        } => write(sql, WriteKind::Delete, &schema, &records, &destination, &keys),

        Command::GetTable { source } => {
            let query = match source {
                TableSource::Query(q) => q,
                TableSource::Key(name) => select_all(&name),
            };
            Ok(Output::Table(Some(sql.execute_reader(&query)?)))
        }
        Command::PutTable { destination, table } => put_table(sql, &destination, table),

        Command::GetScalar { query } => Ok(Output::Scalar(sql.execute_scalar(&query)?)),
        Command::GetList { query, schema } => {
            let table = sql.execute_reader(&query)?;
            Ok(Output::Records(shape_rows(&schema, &table.rows)?))
        }

        Command::ExecuteRaw { statement } => Ok(Output::Count(sql.execute_non_query(&statement)?)),
        Command::ExecuteTransaction { batch } => {
            Ok(Output::Count(execute_batch(&mut RelationalBatch::new(sql), batch)?))
        }

        _ => Err(unsupported(backend, op)),
    }
}

fn run(sql: &mut dyn RelationalTransport, statements: Vec<Statement>) -> Result<Output> {
    let batch = Batch::from_statements(statements);
    Ok(Output::Count(execute_batch(&mut RelationalBatch::new(sql), batch)?))
}

fn write(
    sql: &mut dyn RelationalTransport,
    op: WriteKind,
    schema: &Schema,
    records: &[Record],
    destination: &str,
    keys: &[String],
) -> Result<Output> {
    let commands =
        CommandBuilder::new(schema, Dialect::Sql).build_many(op, records, destination, keys)?;
    run(sql, statements_only(commands)?)
}

fn put_table(sql: &mut dyn RelationalTransport, destination: &str, table: Table) -> Result<Output> {
    let current = sql.execute_reader(&select_all(destination))?;
    let diff = reconcile(&current.rows, &table.rows, &table.key_columns);
    run(sql, diff.statements(&Dialect::Sql, destination, &sync_columns(&table))?)
}
