//! Typed records.
//!
//! [`Entity`] connects a Rust type to its [`Schema`] and converts instances to
//! and from [`Record`]s. Implement it by hand or with the [`entity!`] macro:
//!
//! ```
//! use datacom_core::{entity, Entity};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Person {
//!     id: i64,
//!     name: String,
//! }
//!
//! entity!(Person { id: Int, name: String });
//!
//! let p = Person { id: 1, name: "a".into() };
//! assert_eq!(Person::schema().names(), vec!["id", "name"]);
//! assert_eq!(Person::from_record(&p.to_record()).unwrap(), p);
//! ```
//!
//! `String`, `i64`, `f64` and `bool` implement `Entity` with scalar schemas so
//! that plain values can be pushed onto key-value lists.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::record::Record;
use crate::schema::{Schema, SCALAR_ATTRIBUTE};
use crate::value::Value;

/// A record type with a fixed schema.
pub trait Entity: Sized {
    /// Schema of this type, derived once.
    fn schema() -> &'static Schema;

    /// Attribute values of this instance.
    fn to_record(&self) -> Record;

    /// Rebuild an instance from stored attributes.
    fn from_record(record: &Record) -> Result<Self>;
}

/// Conversion from a stored attribute value.
pub trait FromValue: Sized {
    /// Convert `value`, reporting `attribute` on mismatch.
    fn from_value(value: &Value, attribute: &str) -> Result<Self>;
}

fn mismatch(attribute: &str, expected: &str, actual: &Value) -> Error {
    Error::TypeMismatch {
        attribute: attribute.to_string(),
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

impl FromValue for Value {
    fn from_value(value: &Value, _attribute: &str) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value, attribute: &str) -> Result<Self> {
        value.as_int().ok_or_else(|| mismatch(attribute, "Int", value))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value, attribute: &str) -> Result<Self> {
        let wide = i64::from_value(value, attribute)?;
        i32::try_from(wide).map_err(|_| mismatch(attribute, "Int (32-bit)", value))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value, attribute: &str) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            other => Err(mismatch(attribute, "Float", other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value, attribute: &str) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch(attribute, "Bool", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value, attribute: &str) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(attribute, "String", value))
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value, attribute: &str) -> Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| mismatch(attribute, "DateTime", value)),
            other => Err(mismatch(attribute, "DateTime", other)),
        }
    }
}

impl FromValue for Record {
    fn from_value(value: &Value, attribute: &str) -> Result<Self> {
        value
            .as_record()
            .cloned()
            .ok_or_else(|| mismatch(attribute, "Record", value))
    }
}

impl FromValue for Vec<Value> {
    fn from_value(value: &Value, attribute: &str) -> Result<Self> {
        value
            .as_array()
            .map(<[Value]>::to_vec)
            .ok_or_else(|| mismatch(attribute, "Array", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, attribute: &str) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value, attribute).map(Some)
        }
    }
}

macro_rules! scalar_entity {
    ($ty:ty, $name:literal) => {
        impl Entity for $ty {
            fn schema() -> &'static Schema {
                static SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::scalar($name));
                &SCHEMA
            }

            fn to_record(&self) -> Record {
                Record::new().with(SCALAR_ATTRIBUTE, self.clone())
            }

            fn from_record(record: &Record) -> Result<Self> {
                <$ty>::from_value(record.value_or_null(SCALAR_ATTRIBUTE), SCALAR_ATTRIBUTE)
            }
        }
    };
}

scalar_entity!(String, "String");
scalar_entity!(i64, "Int");
scalar_entity!(f64, "Float");
scalar_entity!(bool, "Bool");

/// Implement [`Entity`] for a struct with named fields.
///
/// Each field is listed with its [`ValueKind`](crate::ValueKind) variant;
/// field types must convert into [`Value`] and implement [`FromValue`].
#[macro_export]
macro_rules! entity {
    ($ty:ident { $($field:ident : $kind:ident),* $(,)? }) => {
        impl $crate::Entity for $ty {
            fn schema() -> &'static $crate::Schema {
                static SCHEMA: $crate::__private::Lazy<$crate::Schema> =
                    $crate::__private::Lazy::new(|| {
                        $crate::Schema::new(stringify!($ty))
                            $(.attribute(stringify!($field), $crate::ValueKind::$kind))*
                    });
                &SCHEMA
            }

            fn to_record(&self) -> $crate::Record {
                $crate::Record::new()
                    $(.with(stringify!($field), $crate::Value::from(self.$field.clone())))*
            }

            fn from_record(record: &$crate::Record) -> $crate::Result<Self> {
                Ok(Self {
                    $($field: <_ as $crate::FromValue>::from_value(
                        record.value_or_null(stringify!($field)),
                        stringify!($field),
                    )?,)*
                })
            }
        }
    };
}
