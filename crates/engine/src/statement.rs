//! Backend-native commands.
//!
//! A [`NativeCommand`] is either a [`Statement`] (SQL or CQL text with bound
//! parameters) or a [`ListMutation`] (a JSON payload applied to the list
//! stored under a key). Commands are immutable once built.

use datacom_core::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One bound parameter.
///
/// SQL statements reference it as `@name`; positional CQL statements bind
/// parameters in order and ignore the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name, without the `@` prefix
    pub name: String,
    /// Bound value
    pub value: Value,
}

impl Param {
    /// Create a new parameter.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Statement text with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// SQL or CQL text
    pub text: String,
    /// Parameters in binding order
    #[serde(default)]
    pub params: Vec<Param>,
}

impl Statement {
    /// Statement without parameters.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    /// Builder: bind a parameter.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.push(Param::new(name, value));
        self
    }

    /// Look up a parameter value by name.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

impl From<&str> for Statement {
    fn from(text: &str) -> Self {
        Statement::new(text)
    }
}

impl From<String> for Statement {
    fn from(text: String) -> Self {
        Statement::new(text)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Kind of structured write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WriteKind {
    /// Append / insert
    Insert,
    /// Replace matching entries (append on miss for lists)
    Update,
    /// Remove matching entries
    Delete,
}

impl WriteKind {
    /// Lowercase operation name
    pub fn name(&self) -> &'static str {
        match self {
            WriteKind::Insert => "insert",
            WriteKind::Update => "update",
            WriteKind::Delete => "delete",
        }
    }
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Patch against the list stored under `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMutation {
    /// Store key holding the list
    pub key: String,
    /// JSON-encoded record
    pub payload: String,
    /// What to do with matching entries
    pub op: WriteKind,
    /// Key attributes used to find matching entries
    #[serde(default)]
    pub keys: Vec<String>,
}

impl fmt::Display for ListMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.op, self.key, self.payload)
    }
}

/// One backend-native instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NativeCommand {
    /// SQL / CQL
    Statement(Statement),
    /// Key-value list patch
    List(ListMutation),
}

impl NativeCommand {
    /// The statement, if this is one.
    pub fn as_statement(&self) -> Option<&Statement> {
        match self {
            NativeCommand::Statement(s) => Some(s),
            NativeCommand::List(_) => None,
        }
    }

    /// The list mutation, if this is one.
    pub fn as_list(&self) -> Option<&ListMutation> {
        match self {
            NativeCommand::List(m) => Some(m),
            NativeCommand::Statement(_) => None,
        }
    }
}

impl fmt::Display for NativeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeCommand::Statement(s) => write!(f, "{}", s),
            NativeCommand::List(m) => write!(f, "{}", m),
        }
    }
}

/// `SELECT * FROM destination`
pub fn select_all(destination: &str) -> Statement {
    Statement::new(format!("SELECT * FROM {}", destination))
}

/// `keyspace.table`, or `table` when the keyspace is blank.
pub fn qualified(keyspace: &str, table: &str) -> String {
    if keyspace.trim().is_empty() {
        table.to_string()
    } else {
        format!("{}.{}", keyspace, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_and_lookup() {
        let s = Statement::new("SELECT * FROM t WHERE id=@id").bind("id", 3i64);
        assert_eq!(s.param("id"), Some(&Value::Int(3)));
        assert_eq!(s.param("missing"), None);
        assert_eq!(s.to_string(), "SELECT * FROM t WHERE id=@id");
    }

    #[test]
    fn test_qualified() {
        assert_eq!(qualified("shop", "orders"), "shop.orders");
        assert_eq!(qualified("  ", "orders"), "orders");
    }

    #[test]
    fn test_native_command_accessors() {
        let cmd = NativeCommand::Statement(select_all("t"));
        assert!(cmd.as_list().is_none());
        assert_eq!(cmd.as_statement().map(|s| s.text.as_str()), Some("SELECT * FROM t"));
    }
}
