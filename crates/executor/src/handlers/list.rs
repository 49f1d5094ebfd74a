//! Key-value list command handlers (Redis, Etcd).
//!
//! Records live as JSON entries of the list stored under the destination
//! key. A write reads the whole list, applies every mutation in memory and
//! stores the result with one `list_set`, so a failing record leaves the
//! stored list untouched.

use datacom_core::{Error, Record, Result, Schema, Table};
use datacom_engine::codec;
use datacom_engine::transport::list;
use datacom_engine::{
    apply_mutation, reconcile, CommandBuilder, Connection, Dialect, ListTransport, NativeCommand,
    WriteKind,
};

use super::unsupported;
use crate::command::TableSource;
use crate::{Command, Output};

/// Handle a command against a key-value backend.
pub fn handle(conn: &mut dyn Connection, cmd: Command) -> Result<Output> {
    let backend = conn.backend();
    let op = cmd.operation();
    let kv = list(conn)?;
    match cmd {
        Command::Insert {
            destination,
            schema,
            records,
        } => write(kv, WriteKind::Insert, &schema, &records, &destination, &[]),
        Command::Update {
            destination,
            schema,
            records,
            keys,
        } => write(kv, WriteKind::Update, &schema, &records, &destination, &keys),
        Command::Delete {
            destination,
            schema,
            records,
            keys,
        } => write(kv, WriteKind::Delete, &schema, &records, &destination, &keys),

        Command::GetTable {
            source: TableSource::Key(key),
        } => match kv.get(&key)? {
            Some(text) => Ok(Output::Table(Some(codec::decode_table(&text)?))),
            None => Ok(Output::Table(None)),
        },
        Command::PutTable { destination, table } => put_table(kv, &destination, &table),

        Command::Get { key } => Ok(Output::Text(kv.get(&key)?)),
        Command::Set { key, value } => {
            kv.put(&key, &value)?;
            Ok(Output::Count(1))
        }

        Command::FetchIndex { key, schema, index } => {
            let entry = kv.list_range(&key, index, index)?;
            match entry.first() {
                Some(text) => Ok(Output::MaybeRecord(Some(codec::decode_record(&schema, text)?))),
                None => Ok(Output::MaybeRecord(None)),
            }
        }
        Command::FetchRange {
            key,
            schema,
            start,
            end,
        } => {
            let entries = kv.list_range(&key, start, end)?;
            let records = entries
                .iter()
                .map(|e| codec::decode_record(&schema, e))
                .collect::<Result<Vec<Record>>>()?;
            Ok(Output::Records(records))
        }

        _ => Err(unsupported(backend, op)),
    }
}

fn write(
    kv: &mut dyn ListTransport,
    op: WriteKind,
    schema: &Schema,
    records: &[Record],
    destination: &str,
    keys: &[String],
) -> Result<Output> {
    let commands =
        CommandBuilder::new(schema, Dialect::List).build_many(op, records, destination, keys)?;
    let mut entries = kv.list_range(destination, 0, -1)?;
    let mut total = 0;
    for command in &commands {
        let mutation = match command {
            NativeCommand::List(m) => m,
            NativeCommand::Statement(s) => {
                return Err(Error::Internal {
                    reason: format!("list store received statement '{}'", s),
                })
            }
        };
        total += apply_mutation(&mut entries, schema, mutation)?;
    }
    kv.list_set(destination, &entries)?;
    Ok(Output::Count(total))
}

fn put_table(kv: &mut dyn ListTransport, destination: &str, table: &Table) -> Result<Output> {
    let current = match kv.get(destination)? {
        Some(text) => codec::decode_table(&text)?.rows,
        None => Vec::new(),
    };
    let diff = reconcile(&current, &table.rows, &table.key_columns);
    kv.put(destination, &codec::encode_table(table)?)?;
    Ok(Output::Count(diff.affected()))
}
