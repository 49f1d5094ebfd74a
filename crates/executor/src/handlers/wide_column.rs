//! Cassandra command handlers.

use datacom_core::{Record, Result, Schema};
use datacom_engine::codec;
use datacom_engine::transport::cql;
use datacom_engine::{
    build_row_insert, execute_batch, qualified, reconcile, select_all, Batch, CommandBuilder,
    Connection, CqlBatch, CqlTransport, Dialect, Param, Statement, WriteKind,
};

use super::{shape_rows, statements_only, sync_columns, unsupported};
use crate::command::TableSource;
use crate::{Command, Output};

/// Handle a command against Cassandra.
pub fn handle(conn: &mut dyn Connection, cmd: Command) -> Result<Output> {
    let backend = conn.backend();
    let op = cmd.operation();
    let cass = cql(conn)?;
    let keyspace = cass.keyspace().to_string();
    let dialect = Dialect::Cql {
        keyspace: keyspace.clone(),
    };
    match cmd {
        Command::Insert {
            destination,
            schema,
            records,
        } => write(cass, &dialect, WriteKind::Insert, &schema, &records, &destination, &[]),
        Command::Update {
            destination,
            schema,
            records,
            keys,
        } => write(cass, &dialect, WriteKind::Update, &schema, &records, &destination, &keys),
        Command::Delete {
            destination,
            schema,
            records,
            keys,
        } => write(cass, &dialect, WriteKind::Delete, &schema, &records, &destination, &keys),

        Command::GetTable { source } => {
            let query = match source {
                TableSource::Query(q) => q,
                TableSource::Key(name) => select_all(&qualified(&keyspace, &name)),
            };
            Ok(Output::Table(Some(cass.query(&query)?)))
        }
        Command::PutTable { destination, table } => {
            let current = cass.query(&select_all(&qualified(&keyspace, &destination)))?;
            let diff = reconcile(&current.rows, &table.rows, &table.key_columns);
            let statements = diff.statements(&dialect, &destination, &sync_columns(&table))?;
            run(cass, statements)
        }

        Command::Get { key } => {
            let table = cass.query(&select_all(&qualified(&keyspace, &key)))?;
            Ok(Output::Text(Some(codec::rows_to_json(&table.rows)?)))
        }
        Command::Set { key, value } => {
            let rows = codec::json_to_rows(&value, &[])?;
            let statements = rows
                .iter()
                .map(|row| {
                    let columns: Vec<&str> = row.names().collect();
                    build_row_insert(&dialect, &key, &columns, row)
                })
                .collect::<Result<Vec<Statement>>>()?;
            run(cass, statements)
        }

        Command::FetchRange {
            key,
            schema,
            start,
            end,
        } => {
            if start != 0 || end != -1 {
                return Err(unsupported(backend, op));
            }
            let table = cass.query(&select_all(&qualified(&keyspace, &key)))?;
            Ok(Output::Records(shape_rows(&schema, &table.rows)?))
        }
        Command::FetchWhere {
            table,
            schema,
            filter,
        } => {
            let rows = cass.query(&filter_query(&keyspace, &table, &filter))?;
            Ok(Output::Records(shape_rows(&schema, &rows.rows)?))
        }

        _ => Err(unsupported(backend, op)),
    }
}

fn run(cass: &mut dyn CqlTransport, statements: Vec<Statement>) -> Result<Output> {
    let batch = Batch::from_statements(statements);
    Ok(Output::Count(execute_batch(&mut CqlBatch::new(cass), batch)?))
}

fn write(
    cass: &mut dyn CqlTransport,
    dialect: &Dialect,
    op: WriteKind,
    schema: &Schema,
    records: &[Record],
    destination: &str,
    keys: &[String],
) -> Result<Output> {
    let commands =
        CommandBuilder::new(schema, dialect.clone()).build_many(op, records, destination, keys)?;
    run(cass, statements_only(commands)?)
}

/// `SELECT * FROM ks.table WHERE a=? AND ..` over `filter`.
fn filter_query(keyspace: &str, table: &str, filter: &[Param]) -> Statement {
    let mut query = select_all(&qualified(keyspace, table));
    if !filter.is_empty() {
        let predicate: Vec<String> = filter.iter().map(|p| format!("{}=?", p.name)).collect();
        query.text.push_str(" WHERE ");
        query.text.push_str(&predicate.join(" AND "));
        query.params = filter.to_vec();
    }
    query
}
