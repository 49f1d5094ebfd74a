//! JSON encoding for key-value payloads.
//!
//! List entries and serialized tables are stored as JSON text. Encoding is
//! driven by the [`Schema`]: structured records become objects with keys in
//! attribute order, scalar schemas encode the bare value. Decoding coerces each
//! attribute to its declared [`ValueKind`]:
//!
//! - RFC 3339 strings become `DateTime` when the attribute is a date-time
//! - Integers widen to `Float` when the attribute is a float
//! - Anything else that does not fit fails `TypeMismatch`

use chrono::{DateTime, SecondsFormat, Utc};
use datacom_core::{
    Attribute, Error, Field, Record, Result, Schema, Table, Value, ValueKind, SCALAR_ATTRIBUTE,
};
use serde_json::{Map, Number, Value as Json};

/// Convert a value to JSON.
///
/// Non-finite floats have no JSON form and encode as `null`.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number((*i).into()),
        Value::Float(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::DateTime(dt) => Json::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        Value::Array(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Record(r) => Json::Object(record_to_object(r)),
    }
}

fn record_to_object(record: &Record) -> Map<String, Json> {
    record
        .fields()
        .iter()
        .map(|f| (f.name.clone(), value_to_json(&f.value)))
        .collect()
}

fn json_type(json: &Json) -> &'static str {
    match json {
        Json::Null => "Null",
        Json::Bool(_) => "Bool",
        Json::Number(n) if n.is_i64() || n.is_u64() => "Int",
        Json::Number(_) => "Float",
        Json::String(_) => "String",
        Json::Array(_) => "Array",
        Json::Object(_) => "Record",
    }
}

fn mismatch(attribute: &str, kind: ValueKind, json: &Json) -> Error {
    Error::TypeMismatch {
        attribute: attribute.to_string(),
        expected: kind.name().to_string(),
        actual: json_type(json).to_string(),
    }
}

/// Convert JSON to a value of the declared kind.
pub fn json_to_value(json: &Json, kind: ValueKind, attribute: &str) -> Result<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }
    let value = match (kind, json) {
        (ValueKind::Any, Json::Bool(b)) => Value::Bool(*b),
        (ValueKind::Any, Json::Number(n)) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        (ValueKind::Any, Json::String(s)) => Value::String(s.clone()),
        (ValueKind::Any | ValueKind::Array, Json::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| json_to_value(item, ValueKind::Any, attribute))
                .collect::<Result<_>>()?,
        ),
        (ValueKind::Any | ValueKind::Record, Json::Object(map)) => {
            Value::Record(object_to_record(map)?)
        }
        (ValueKind::Bool, Json::Bool(b)) => Value::Bool(*b),
        (ValueKind::Int, Json::Number(n)) => {
            Value::Int(n.as_i64().ok_or_else(|| mismatch(attribute, kind, json))?)
        }
        (ValueKind::Float, Json::Number(n)) => {
            Value::Float(n.as_f64().ok_or_else(|| mismatch(attribute, kind, json))?)
        }
        (ValueKind::String, Json::String(s)) => Value::String(s.clone()),
        (ValueKind::DateTime, Json::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
            .map_err(|_| mismatch(attribute, kind, json))?,
        _ => return Err(mismatch(attribute, kind, json)),
    };
    Ok(value)
}

fn object_to_record(map: &Map<String, Json>) -> Result<Record> {
    map.iter()
        .map(|(name, json)| -> Result<Field> {
            Ok(Field::new(name.clone(), json_to_value(json, ValueKind::Any, name)?))
        })
        .collect()
}

/// Encode a record for storage.
pub fn encode_record(schema: &Schema, record: &Record) -> Result<String> {
    let json = record_json(schema, record);
    Ok(serde_json::to_string(&json)?)
}

fn record_json(schema: &Schema, record: &Record) -> Json {
    if schema.is_scalar() {
        return value_to_json(record.value_or_null(SCALAR_ATTRIBUTE));
    }
    Json::Object(
        schema
            .attributes()
            .iter()
            .map(|a| (a.name.clone(), value_to_json(record.value_or_null(&a.name))))
            .collect(),
    )
}

/// Decode a stored entry.
///
/// Attributes the schema does not declare are ignored; declared attributes
/// missing from the entry decode as `Null`.
pub fn decode_record(schema: &Schema, text: &str) -> Result<Record> {
    let json: Json = serde_json::from_str(text)?;
    if schema.is_scalar() {
        let value = json_to_value(&json, ValueKind::Any, SCALAR_ATTRIBUTE)?;
        return Ok(Record::new().with(SCALAR_ATTRIBUTE, value));
    }
    match &json {
        Json::Object(map) => object_with_columns(map, schema.attributes()),
        other => Err(Error::Serialization {
            reason: format!(
                "expected a JSON object for '{}', found {}",
                schema.name(),
                json_type(other)
            ),
        }),
    }
}

fn object_with_columns(map: &Map<String, Json>, columns: &[Attribute]) -> Result<Record> {
    if columns.is_empty() {
        return object_to_record(map);
    }
    columns
        .iter()
        .map(|c| -> Result<Field> {
            let json = map.get(&c.name).unwrap_or(&Json::Null);
            Ok(Field::new(c.name.clone(), json_to_value(json, c.kind, &c.name)?))
        })
        .collect()
}

/// Encode rows as a JSON array of objects.
pub fn rows_to_json(rows: &[Record]) -> Result<String> {
    let array: Vec<Json> = rows.iter().map(|r| Json::Object(record_to_object(r))).collect();
    Ok(serde_json::to_string(&array)?)
}

/// Decode a JSON array of objects.
///
/// With `columns`, each row is reduced to those columns and coerced to their
/// kinds; without, every key is kept as-is.
pub fn json_to_rows(text: &str, columns: &[Attribute]) -> Result<Vec<Record>> {
    let json: Json = serde_json::from_str(text)?;
    let items = match json {
        Json::Array(items) => items,
        other => {
            return Err(Error::Serialization {
                reason: format!("expected a JSON array of rows, found {}", json_type(&other)),
            })
        }
    };
    items
        .iter()
        .map(|item| match item {
            Json::Object(map) => object_with_columns(map, columns),
            other => Err(Error::Serialization {
                reason: format!("expected a JSON object row, found {}", json_type(other)),
            }),
        })
        .collect()
}

/// Encode a whole table.
pub fn encode_table(table: &Table) -> Result<String> {
    let mut map = Map::new();
    map.insert("columns".into(), serde_json::to_value(&table.columns)?);
    map.insert("key_columns".into(), serde_json::to_value(&table.key_columns)?);
    map.insert(
        "rows".into(),
        Json::Array(
            table
                .rows
                .iter()
                .map(|r| Json::Object(record_to_object(r)))
                .collect(),
        ),
    );
    Ok(serde_json::to_string(&Json::Object(map))?)
}

/// Decode a table written by [`encode_table`].
pub fn decode_table(text: &str) -> Result<Table> {
    let json: Json = serde_json::from_str(text)?;
    let map = match json {
        Json::Object(map) => map,
        other => {
            return Err(Error::Serialization {
                reason: format!("expected a JSON table object, found {}", json_type(&other)),
            })
        }
    };
    let columns: Vec<Attribute> = match map.get("columns") {
        Some(c) => serde_json::from_value(c.clone())?,
        None => Vec::new(),
    };
    let key_columns: Vec<String> = match map.get("key_columns") {
        Some(k) => serde_json::from_value(k.clone())?,
        None => Vec::new(),
    };
    let rows = match map.get("rows") {
        Some(Json::Array(items)) => items
            .iter()
            .map(|item| match item {
                Json::Object(row) => object_with_columns(row, &columns),
                other => Err(Error::Serialization {
                    reason: format!("expected a JSON object row, found {}", json_type(other)),
                }),
            })
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::Serialization {
                reason: format!("expected a JSON array of rows, found {}", json_type(other)),
            })
        }
        None => Vec::new(),
    };
    Ok(Table {
        columns,
        key_columns,
        rows,
    })
}
