//! Key matching and record comparison.
//!
//! Key-value and wide-column stores have no `UPDATE ... WHERE`. Updates and
//! deletes are emulated by scanning the stored entries and comparing key
//! attributes with [`matches`]. Every match is affected, not just the first,
//! and an update that matches nothing appends the record instead.

use datacom_core::{Error, Record, Result, Schema, Value};

use crate::codec;
use crate::statement::{ListMutation, WriteKind};

/// True iff every key attribute holds an equal value in both records.
///
/// Attributes missing from a record read as `Null`; two nulls match, a null
/// never matches a value. Key values must be scalar.
pub fn matches<S: AsRef<str>>(candidate: &Record, keys: &[S], target: &Record) -> Result<bool> {
    if keys.is_empty() {
        return Err(Error::EmptyKeys);
    }
    for key in keys {
        let key = key.as_ref();
        let left = candidate.value_or_null(key);
        let right = target.value_or_null(key);
        for value in [left, right] {
            if !value.is_scalar() {
                return Err(Error::InvalidSchema {
                    schema: "record".to_string(),
                    reason: format!("key '{}' holds a non-scalar {}", key, value.type_name()),
                });
            }
        }
        if left != right {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Full-row equality. Attributes present on only one side compare as `Null`.
///
/// Unlike key matching this is reflexive: a NaN float equals another NaN, so
/// a row always equals itself.
pub fn records_equal(a: &Record, b: &Record) -> bool {
    a.names()
        .chain(b.names())
        .all(|name| same_value(a.value_or_null(name), b.value_or_null(name)))
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| same_value(x, y))
        }
        (Value::Record(x), Value::Record(y)) => records_equal(x, y),
        _ => a == b,
    }
}

/// Indices of all entries matching `target` on `keys`, in order.
pub fn find_matches<S: AsRef<str>>(
    entries: &[Record],
    keys: &[S],
    target: &Record,
) -> Result<Vec<usize>> {
    let mut found = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        if matches(entry, keys, target)? {
            found.push(i);
        }
    }
    Ok(found)
}

/// Apply a list mutation to stored JSON entries, returning the count changed.
///
/// - Insert appends and counts 1
/// - Update overwrites every match; with no match it appends and counts 1
/// - Delete removes every match; with no match nothing changes and it counts 0
pub fn apply_mutation(
    entries: &mut Vec<String>,
    schema: &Schema,
    mutation: &ListMutation,
) -> Result<u64> {
    if mutation.op == WriteKind::Insert {
        entries.push(mutation.payload.clone());
        return Ok(1);
    }
    if mutation.keys.is_empty() {
        return Err(Error::EmptyKeys);
    }

    let target = codec::decode_record(schema, &mutation.payload)?;
    let decoded = entries
        .iter()
        .map(|e| codec::decode_record(schema, e))
        .collect::<Result<Vec<_>>>()?;
    let hits = find_matches(&decoded, &mutation.keys, &target)?;

    match mutation.op {
        WriteKind::Update if hits.is_empty() => {
            entries.push(mutation.payload.clone());
            Ok(1)
        }
        WriteKind::Update => {
            for &i in &hits {
                entries[i] = mutation.payload.clone();
            }
            Ok(hits.len() as u64)
        }
        WriteKind::Delete => {
            for &i in hits.iter().rev() {
                entries.remove(i);
            }
            Ok(hits.len() as u64)
        }
        WriteKind::Insert => Ok(0),
    }
}
