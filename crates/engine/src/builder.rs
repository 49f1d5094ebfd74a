//! Command builder.
//!
//! Turns a record plus its [`Schema`] into one backend-native command.
//!
//! | Dialect | Insert | Update | Delete |
//! |---------|--------|--------|--------|
//! | SQL | `INSERT INTO d (a,b) VALUES (@a,@b)` | `UPDATE d SET b=@b WHERE a=@a` | `DELETE FROM d WHERE a=@a` |
//! | CQL | `INSERT INTO ks.d (a,b) VALUES (1,'x')` | `UPDATE ks.d SET b='x' WHERE a=1` | `DELETE FROM ks.d WHERE a=1` |
//! | List | append payload | replace matches, append on miss | remove matches |
//!
//! SQL binds named parameters. CQL inlines literals for partial updates, and
//! uses positional `?` parameters for table synchronization.

use datacom_core::{Error, Record, Result, Schema, Value};

use crate::codec;
use crate::statement::{qualified, ListMutation, NativeCommand, Param, Statement, WriteKind};

/// Native command family of a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    /// Relational SQL with `@name` parameters
    Sql,
    /// Cassandra CQL within a keyspace
    Cql {
        /// Keyspace statements are qualified with
        keyspace: String,
    },
    /// JSON entries in a key-value list
    List,
}

/// Builds commands for one record type in one dialect.
#[derive(Debug, Clone)]
pub struct CommandBuilder<'a> {
    schema: &'a Schema,
    dialect: Dialect,
}

impl<'a> CommandBuilder<'a> {
    /// Create a builder.
    pub fn new(schema: &'a Schema, dialect: Dialect) -> Self {
        Self { schema, dialect }
    }

    /// Build one command.
    pub fn build<S: AsRef<str>>(
        &self,
        op: WriteKind,
        record: &Record,
        destination: &str,
        keys: &[S],
    ) -> Result<NativeCommand> {
        self.validate(op, destination, keys)?;
        let keys: Vec<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
        match &self.dialect {
            Dialect::Sql => Ok(NativeCommand::Statement(self.sql(op, record, destination, &keys)?)),
            Dialect::Cql { keyspace } => {
                let table = qualified(keyspace, destination);
                Ok(NativeCommand::Statement(self.cql(op, record, &table, &keys)?))
            }
            Dialect::List => Ok(NativeCommand::List(ListMutation {
                key: destination.to_string(),
                payload: codec::encode_record(self.schema, record)?,
                op,
                keys: if op == WriteKind::Insert { Vec::new() } else { keys },
            })),
        }
    }

    /// Build one command per record. An empty slice fails `NullRecord`.
    pub fn build_many<S: AsRef<str>>(
        &self,
        op: WriteKind,
        records: &[Record],
        destination: &str,
        keys: &[S],
    ) -> Result<Vec<NativeCommand>> {
        if records.is_empty() {
            return Err(Error::NullRecord {
                operation: op.name().to_string(),
            });
        }
        records
            .iter()
            .map(|r| self.build(op, r, destination, keys))
            .collect()
    }

    /// Insert `record` into `destination`.
    pub fn build_insert(&self, record: &Record, destination: &str) -> Result<NativeCommand> {
        let none: [&str; 0] = [];
        self.build(WriteKind::Insert, record, destination, &none)
    }

    /// Update rows of `destination` matching `record` on `keys`.
    pub fn build_update<S: AsRef<str>>(
        &self,
        record: &Record,
        destination: &str,
        keys: &[S],
    ) -> Result<NativeCommand> {
        self.build(WriteKind::Update, record, destination, keys)
    }

    /// Delete rows of `destination` matching `record` on `keys`.
    pub fn build_delete<S: AsRef<str>>(
        &self,
        record: &Record,
        destination: &str,
        keys: &[S],
    ) -> Result<NativeCommand> {
        self.build(WriteKind::Delete, record, destination, keys)
    }

    fn validate<S: AsRef<str>>(&self, op: WriteKind, destination: &str, keys: &[S]) -> Result<()> {
        if destination.trim().is_empty() {
            return Err(Error::NullDestination {
                operation: op.name().to_string(),
            });
        }
        let structural = !(self.dialect == Dialect::List && op == WriteKind::Insert);
        if structural {
            self.schema.check_structural(op.name())?;
        }
        if op == WriteKind::Insert {
            return Ok(());
        }
        if keys.is_empty() && self.dialect == Dialect::List {
            return Err(Error::EmptyKeys);
        }
        self.schema.check_keys(keys, op.name())
    }

    fn non_keys(&self, keys: &[String]) -> Vec<&str> {
        self.schema
            .names()
            .into_iter()
            .filter(|n| !keys.iter().any(|k| k == n))
            .collect()
    }

    fn sql(&self, op: WriteKind, record: &Record, destination: &str, keys: &[String]) -> Result<Statement> {
        let bind = |names: &[&str]| -> Vec<Param> {
            names
                .iter()
                .map(|n| Param::new(*n, record.value_or_null(n).clone()))
                .collect()
        };
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        match op {
            WriteKind::Insert => {
                let names = self.schema.names();
                let placeholders: Vec<String> = names.iter().map(|n| format!("@{}", n)).collect();
                Ok(Statement {
                    text: format!(
                        "INSERT INTO {} ({}) VALUES ({})",
                        destination,
                        names.join(","),
                        placeholders.join(",")
                    ),
                    params: bind(&names),
                })
            }
            WriteKind::Update => {
                let mut set = self.non_keys(&keys_owned(&keys));
                let mut params = bind(&set);
                if set.is_empty() {
                    set = keys.clone();
                }
                params.extend(bind(&keys));
                Ok(Statement {
                    text: format!(
                        "UPDATE {} SET {} WHERE {}",
                        destination,
                        assignments(&set, |n| format!("@{}", n)),
                        predicate(&keys, |n| format!("@{}", n))
                    ),
                    params,
                })
            }
            WriteKind::Delete => Ok(Statement {
                text: format!(
                    "DELETE FROM {} WHERE {}",
                    destination,
                    predicate(&keys, |n| format!("@{}", n))
                ),
                params: bind(&keys),
            }),
        }
    }

    fn cql(&self, op: WriteKind, record: &Record, table: &str, keys: &[String]) -> Result<Statement> {
        let lit = |n: &str| cql_literal(record.value_or_null(n));
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let text = match op {
            WriteKind::Insert => {
                let names = self.schema.names();
                let values: Vec<String> = names.iter().map(|n| lit(n)).collect();
                format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    table,
                    names.join(","),
                    values.join(",")
                )
            }
            WriteKind::Update => {
                let set = self.non_keys(&keys_owned(&keys));
                if set.is_empty() {
                    return Err(Error::InvalidSchema {
                        schema: self.schema.name().to_string(),
                        reason: "every attribute is a key; nothing to update".to_string(),
                    });
                }
                format!(
                    "UPDATE {} SET {} WHERE {}",
                    table,
                    assignments(&set, lit),
                    predicate(&keys, lit)
                )
            }
            WriteKind::Delete => format!("DELETE FROM {} WHERE {}", table, predicate(&keys, lit)),
        };
        Ok(Statement::new(text))
    }
}

fn keys_owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

fn assignments<F: Fn(&str) -> String>(names: &[&str], rhs: F) -> String {
    names
        .iter()
        .map(|n| format!("{}={}", n, rhs(n)))
        .collect::<Vec<_>>()
        .join(",")
}

fn predicate<F: Fn(&str) -> String>(keys: &[&str], rhs: F) -> String {
    keys.iter()
        .map(|k| format!("{}={}", k, rhs(k)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Render a value as an inline CQL literal.
pub fn cql_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => quote(s),
        Value::DateTime(dt) => quote(&dt.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string()),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(cql_literal).collect::<Vec<_>>().join(",")
        ),
        Value::Record(r) => format!(
            "{{{}}}",
            r.fields()
                .iter()
                .map(|f| format!("{}:{}", f.name, cql_literal(&f.value)))
                .collect::<Vec<_>>()
                .join(",")
        ),
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn placeholder(dialect: &Dialect, name: &str) -> String {
    match dialect {
        Dialect::Cql { .. } => "?".to_string(),
        _ => format!("@{}", name),
    }
}

fn sync_table(dialect: &Dialect, destination: &str) -> Result<String> {
    match dialect {
        Dialect::Sql => Ok(destination.to_string()),
        Dialect::Cql { keyspace } => Ok(qualified(keyspace, destination)),
        Dialect::List => Err(Error::UnsupportedOperation {
            backend: "list".to_string(),
            operation: "row statement".to_string(),
        }),
    }
}

/// Parameterized insert of one synchronized row over `columns`.
pub fn build_row_insert<S: AsRef<str>>(
    dialect: &Dialect,
    destination: &str,
    columns: &[S],
    row: &Record,
) -> Result<Statement> {
    let table = sync_table(dialect, destination)?;
    let names: Vec<&str> = columns.iter().map(|c| c.as_ref()).collect();
    let marks: Vec<String> = names.iter().map(|n| placeholder(dialect, n)).collect();
    Ok(Statement {
        text: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            names.join(","),
            marks.join(",")
        ),
        params: names
            .iter()
            .map(|n| Param::new(*n, row.value_or_null(n).clone()))
            .collect(),
    })
}

/// Parameterized delete of one synchronized row keyed by `keys`.
pub fn build_row_delete<S: AsRef<str>>(
    dialect: &Dialect,
    destination: &str,
    keys: &[S],
    row: &Record,
) -> Result<Statement> {
    if keys.is_empty() {
        return Err(Error::MissingKeys {
            operation: "delete".to_string(),
        });
    }
    let table = sync_table(dialect, destination)?;
    let names: Vec<&str> = keys.iter().map(|k| k.as_ref()).collect();
    Ok(Statement {
        text: format!(
            "DELETE FROM {} WHERE {}",
            table,
            predicate(&names, |n| placeholder(dialect, n))
        ),
        params: names
            .iter()
            .map(|n| Param::new(*n, row.value_or_null(n).clone()))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use datacom_core::ValueKind;

    fn schema() -> Schema {
        Schema::new("Person")
            .attribute("id", ValueKind::Int)
            .attribute("name", ValueKind::String)
            .attribute("age", ValueKind::Int)
    }

    fn person() -> Record {
        Record::new().with("id", 1i64).with("name", "o'neil").with("age", 30i64)
    }

    fn statement(cmd: NativeCommand) -> Statement {
        match cmd {
            NativeCommand::Statement(s) => s,
            other => panic!("expected statement, got {:?}", other),
        }
    }

    #[test]
    fn test_sql_insert() {
        let s = schema();
        let b = CommandBuilder::new(&s, Dialect::Sql);
        let stmt = statement(b.build_insert(&person(), "people").unwrap());
        assert_eq!(
            stmt.text,
            "INSERT INTO people (id,name,age) VALUES (@id,@name,@age)"
        );
        assert_eq!(stmt.params.len(), 3);
        assert_eq!(stmt.param("name"), Some(&Value::String("o'neil".into())));
    }

    #[test]
    fn test_sql_update_sets_non_keys() {
        let s = schema();
        let b = CommandBuilder::new(&s, Dialect::Sql);
        let stmt = statement(b.build_update(&person(), "people", &["id"]).unwrap());
        assert_eq!(stmt.text, "UPDATE people SET name=@name,age=@age WHERE id=@id");
        let names: Vec<_> = stmt.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["name", "age", "id"]);
    }

    #[test]
    fn test_sql_update_all_keys_sets_keys() {
        let s = Schema::new("Pair")
            .attribute("a", ValueKind::Int)
            .attribute("b", ValueKind::Int);
        let b = CommandBuilder::new(&s, Dialect::Sql);
        let r = Record::new().with("a", 1i64).with("b", 2i64);
        let stmt = statement(b.build_update(&r, "pairs", &["a", "b"]).unwrap());
        assert_eq!(stmt.text, "UPDATE pairs SET a=@a,b=@b WHERE a=@a AND b=@b");
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn test_sql_delete_binds_keys_only() {
        let s = schema();
        let b = CommandBuilder::new(&s, Dialect::Sql);
        let stmt = statement(b.build_delete(&person(), "people", &["id", "name"]).unwrap());
        assert_eq!(stmt.text, "DELETE FROM people WHERE id=@id AND name=@name");
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn test_sql_update_without_keys() {
        let s = schema();
        let b = CommandBuilder::new(&s, Dialect::Sql);
        let none: [&str; 0] = [];
        assert_eq!(
            b.build_update(&person(), "people", &none).unwrap_err(),
            Error::MissingKeys {
                operation: "update".into()
            }
        );
        assert_eq!(
            b.build_delete(&person(), "people", &none).unwrap_err(),
            Error::MissingKeys {
                operation: "delete".into()
            }
        );
    }

    #[test]
    fn test_unknown_key_is_invalid_key_set() {
        let s = schema();
        let b = CommandBuilder::new(&s, Dialect::Sql);
        assert!(matches!(
            b.build_delete(&person(), "people", &["nope"]),
            Err(Error::InvalidKeySet { .. })
        ));
    }

    #[test]
    fn test_blank_destination() {
        let s = schema();
        let b = CommandBuilder::new(&s, Dialect::List);
        assert_eq!(
            b.build_insert(&person(), " ").unwrap_err(),
            Error::NullDestination {
                operation: "insert".into()
            }
        );
    }

    #[test]
    fn test_scalar_schema_only_appends_to_lists() {
        let s = Schema::scalar("String");
        let r = Record::new().with(datacom_core::SCALAR_ATTRIBUTE, "x");
        assert!(CommandBuilder::new(&s, Dialect::List).build_insert(&r, "k").is_ok());
        assert!(matches!(
            CommandBuilder::new(&s, Dialect::Sql).build_insert(&r, "t"),
            Err(Error::InvalidSchema { .. })
        ));
        assert!(matches!(
            CommandBuilder::new(&s, Dialect::List).build_update(&r, "k", &["x"]),
            Err(Error::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_list_update_without_keys_is_empty_keys() {
        let s = schema();
        let b = CommandBuilder::new(&s, Dialect::List);
        let none: [&str; 0] = [];
        assert_eq!(b.build_update(&person(), "k", &none).unwrap_err(), Error::EmptyKeys);
    }

    #[test]
    fn test_list_mutation_payload() {
        let s = schema();
        let b = CommandBuilder::new(&s, Dialect::List);
        let cmd = b.build_update(&person(), "people", &["id"]).unwrap();
        let m = cmd.as_list().unwrap();
        assert_eq!(m.key, "people");
        assert_eq!(m.op, WriteKind::Update);
        assert_eq!(m.keys, vec!["id".to_string()]);
        assert_eq!(m.payload, r#"{"id":1,"name":"o'neil","age":30}"#);
    }

    #[test]
    fn test_cql_inlines_literals() {
        let s = schema();
        let b = CommandBuilder::new(
            &s,
            Dialect::Cql {
                keyspace: "app".into(),
            },
        );
        let insert = statement(b.build_insert(&person(), "people").unwrap());
        assert_eq!(
            insert.text,
            "INSERT INTO app.people (id,name,age) VALUES (1,'o''neil',30)"
        );
        assert!(insert.params.is_empty());

        let update = statement(b.build_update(&person(), "people", &["id"]).unwrap());
        assert_eq!(
            update.text,
            "UPDATE app.people SET name='o''neil',age=30 WHERE id=1"
        );

        let delete = statement(b.build_delete(&person(), "people", &["id"]).unwrap());
        assert_eq!(delete.text, "DELETE FROM app.people WHERE id=1");
    }

    #[test]
    fn test_cql_update_of_keys_only_is_invalid() {
        let s = Schema::new("Key").attribute("id", ValueKind::Int);
        let b = CommandBuilder::new(&s, Dialect::Cql { keyspace: "ks".into() });
        let r = Record::new().with("id", 1i64);
        assert!(matches!(
            b.build_update(&r, "t", &["id"]),
            Err(Error::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_cql_literal_forms() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(cql_literal(&Value::DateTime(dt)), "'2024-01-02T03:04:05.000+0000'");
        assert_eq!(cql_literal(&Value::Null), "null");
        assert_eq!(
            cql_literal(&Value::Array(vec![Value::Int(1), Value::String("a".into())])),
            "[1,'a']"
        );
    }

    #[test]
    fn test_build_many_rejects_empty() {
        let s = schema();
        let b = CommandBuilder::new(&s, Dialect::Sql);
        assert_eq!(
            b.build_many(WriteKind::Insert, &[], "people", &["id"]).unwrap_err(),
            Error::NullRecord {
                operation: "insert".into()
            }
        );
        let cmds = b
            .build_many(WriteKind::Delete, &[person(), person()], "people", &["id"])
            .unwrap();
        assert_eq!(cmds.len(), 2);
    }

    #[test]
    fn test_row_statements() {
        let row = person();
        let cql = Dialect::Cql {
            keyspace: "app".into(),
        };
        let ins = build_row_insert(&cql, "people", &["id", "name"], &row).unwrap();
        assert_eq!(ins.text, "INSERT INTO app.people (id,name) VALUES (?,?)");
        let del = build_row_delete(&Dialect::Sql, "people", &["id"], &row).unwrap();
        assert_eq!(del.text, "DELETE FROM people WHERE id=@id");
        assert_eq!(del.params, vec![Param::new("id", 1i64)]);
        let none: [&str; 0] = [];
        assert!(matches!(
            build_row_delete(&Dialect::Sql, "people", &none, &row),
            Err(Error::MissingKeys { .. })
        ));
    }
}
