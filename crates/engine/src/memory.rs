//! In-memory transports.
//!
//! [`MemoryKv`] behaves like Redis or Etcd and [`MemorySql`] like a relational
//! engine or Cassandra. Handles are cheap clones over shared state, so a test
//! can hand one clone to a client and inspect the store through another.

use datacom_core::{BackendKind, Error, Result, StoreFamily, Table, Value};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::statement::Statement;
use crate::transport::{resolve_range, Connection, CqlTransport, ListTransport, RelationalTransport};

fn not_open(backend: BackendKind) -> Error {
    Error::ExecutionFailed {
        reason: format!("{} connection is not open", backend),
    }
}

// ============================================================================
// Key-value
// ============================================================================

#[derive(Debug, Default)]
struct KvState {
    strings: BTreeMap<String, String>,
    lists: BTreeMap<String, Vec<String>>,
    opens: usize,
    closes: usize,
    fail_writes: bool,
}

/// In-memory Redis / Etcd.
///
/// Redis mode keeps native lists. Etcd has no list type, so Etcd mode stores
/// each list as a JSON array string under its key.
#[derive(Debug, Clone)]
pub struct MemoryKv {
    backend: BackendKind,
    state: Arc<Mutex<KvState>>,
    open: bool,
}

impl MemoryKv {
    /// Redis-like store.
    pub fn redis() -> Self {
        Self::with_backend(BackendKind::Redis)
    }

    /// Etcd-like store.
    pub fn etcd() -> Self {
        Self::with_backend(BackendKind::Etcd)
    }

    fn with_backend(backend: BackendKind) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(KvState::default())),
            open: false,
        }
    }

    /// Make every write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Entries of the list at `key`.
    pub fn entries(&self, key: &str) -> Result<Vec<String>> {
        let state = self.state.lock();
        self.read_list(&state, key)
    }

    /// Raw string at `key`.
    pub fn value(&self, key: &str) -> Option<String> {
        self.state.lock().strings.get(key).cloned()
    }

    /// Number of opens so far
    pub fn opens(&self) -> usize {
        self.state.lock().opens
    }

    /// Number of closes so far
    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }

    fn check_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(not_open(self.backend))
        }
    }

    fn check_write(&self, state: &KvState) -> Result<()> {
        if state.fail_writes {
            return Err(Error::execution(format!("{} rejected the write", self.backend)));
        }
        Ok(())
    }

    fn read_list(&self, state: &KvState, key: &str) -> Result<Vec<String>> {
        match self.backend {
            BackendKind::Etcd => match state.strings.get(key) {
                Some(text) => Ok(serde_json::from_str(text)?),
                None => Ok(Vec::new()),
            },
            _ => Ok(state.lists.get(key).cloned().unwrap_or_default()),
        }
    }
}

impl Connection for MemoryKv {
    fn backend(&self) -> BackendKind {
        self.backend
    }

    fn open(&mut self) -> Result<()> {
        self.state.lock().opens += 1;
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state.lock().closes += 1;
        self.open = false;
        Ok(())
    }

    fn as_list(&mut self) -> Option<&mut dyn ListTransport> {
        Some(self)
    }
}

impl ListTransport for MemoryKv {
    fn get(&mut self, key: &str) -> Result<Option<String>> {
        self.check_open()?;
        let state = self.state.lock();
        if self.backend == BackendKind::Redis && state.lists.contains_key(key) {
            return Err(Error::execution(
                "WRONGTYPE Operation against a key holding the wrong kind of value",
            ));
        }
        Ok(state.strings.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.check_open()?;
        let mut state = self.state.lock();
        self.check_write(&state)?;
        state.lists.remove(key);
        state.strings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn list_range(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        self.check_open()?;
        let state = self.state.lock();
        let list = self.read_list(&state, key)?;
        Ok(match resolve_range(list.len(), start, stop) {
            Some((from, to)) => list[from..to].to_vec(),
            None => Vec::new(),
        })
    }

    fn list_set(&mut self, key: &str, entries: &[String]) -> Result<()> {
        self.check_open()?;
        let mut state = self.state.lock();
        self.check_write(&state)?;
        match self.backend {
            BackendKind::Etcd => {
                let text = serde_json::to_string(entries)?;
                state.strings.insert(key.to_string(), text);
            }
            _ => {
                state.strings.remove(key);
                if entries.is_empty() {
                    state.lists.remove(key);
                } else {
                    state.lists.insert(key.to_string(), entries.to_vec());
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Relational / CQL
// ============================================================================

#[derive(Debug)]
struct SqlState {
    journal: Vec<Statement>,
    pending: Option<Vec<Statement>>,
    commits: usize,
    rollbacks: usize,
    opens: usize,
    closes: usize,
    fail_when: Vec<String>,
    tables: HashMap<String, Table>,
    scalars: HashMap<String, Value>,
    rows_affected: u64,
}

impl Default for SqlState {
    fn default() -> Self {
        Self {
            journal: Vec::new(),
            pending: None,
            commits: 0,
            rollbacks: 0,
            opens: 0,
            closes: 0,
            fail_when: Vec::new(),
            tables: HashMap::new(),
            scalars: HashMap::new(),
            rows_affected: 1,
        }
    }
}

/// In-memory statement sink for relational backends and Cassandra.
///
/// Executed statements land in a journal; inside a transaction they are
/// staged and only reach the journal on commit. Reads return canned results
/// registered by statement text.
#[derive(Debug, Clone)]
pub struct MemorySql {
    backend: BackendKind,
    keyspace: String,
    state: Arc<Mutex<SqlState>>,
    open: bool,
}

impl MemorySql {
    /// Relational store of the given backend kind.
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            keyspace: String::new(),
            state: Arc::new(Mutex::new(SqlState::default())),
            open: false,
        }
    }

    /// Cassandra store within `keyspace`.
    pub fn cassandra(keyspace: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            ..Self::new(BackendKind::Cassandra)
        }
    }

    /// Fail any statement whose text contains `fragment`.
    pub fn fail_when(&self, fragment: impl Into<String>) {
        self.state.lock().fail_when.push(fragment.into());
    }

    /// Rows reported by each non-query statement (default 1).
    pub fn set_rows_affected(&self, rows: u64) {
        self.state.lock().rows_affected = rows;
    }

    /// Result returned for reads of `text`.
    pub fn set_table(&self, text: impl Into<String>, table: Table) {
        self.state.lock().tables.insert(text.into(), table);
    }

    /// Scalar returned for `text`.
    pub fn set_scalar(&self, text: impl Into<String>, value: Value) {
        self.state.lock().scalars.insert(text.into(), value);
    }

    /// Committed statements in order.
    pub fn journal(&self) -> Vec<Statement> {
        self.state.lock().journal.clone()
    }

    /// Text of committed statements in order.
    pub fn journal_texts(&self) -> Vec<String> {
        self.state.lock().journal.iter().map(|s| s.text.clone()).collect()
    }

    /// Number of commits
    pub fn commits(&self) -> usize {
        self.state.lock().commits
    }

    /// Number of rollbacks
    pub fn rollbacks(&self) -> usize {
        self.state.lock().rollbacks
    }

    /// Number of opens
    pub fn opens(&self) -> usize {
        self.state.lock().opens
    }

    /// Number of closes
    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }

    fn check_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(not_open(self.backend))
        }
    }

    fn record(&self, statement: &Statement) -> Result<u64> {
        self.check_open()?;
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if let Some(fragment) = state.fail_when.iter().find(|f| statement.text.contains(f.as_str())) {
            return Err(Error::execution(format!(
                "{} failed on '{}'",
                self.backend, fragment
            )));
        }
        let rows = state.rows_affected;
        match state.pending.as_mut() {
            Some(pending) => pending.push(statement.clone()),
            None => state.journal.push(statement.clone()),
        }
        Ok(rows)
    }

    fn read(&self, statement: &Statement) -> Result<Table> {
        self.check_open()?;
        Ok(self
            .state
            .lock()
            .tables
            .get(&statement.text)
            .cloned()
            .unwrap_or_default())
    }
}

impl Connection for MemorySql {
    fn backend(&self) -> BackendKind {
        self.backend
    }

    fn open(&mut self) -> Result<()> {
        self.state.lock().opens += 1;
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.closes += 1;
        state.pending = None;
        self.open = false;
        Ok(())
    }

    fn as_relational(&mut self) -> Option<&mut dyn RelationalTransport> {
        match self.backend.family() {
            StoreFamily::Relational => Some(self),
            _ => None,
        }
    }

    fn as_cql(&mut self) -> Option<&mut dyn CqlTransport> {
        match self.backend.family() {
            StoreFamily::WideColumn => Some(self),
            _ => None,
        }
    }
}

impl RelationalTransport for MemorySql {
    fn begin(&mut self) -> Result<()> {
        self.check_open()?;
        let mut state = self.state.lock();
        if state.pending.is_some() {
            return Err(Error::execution("transaction already open"));
        }
        state.pending = Some(Vec::new());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.check_open()?;
        let mut state = self.state.lock();
        let staged = state
            .pending
            .take()
            .ok_or_else(|| Error::execution("no open transaction"))?;
        state.journal.extend(staged);
        state.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.pending = None;
        state.rollbacks += 1;
        Ok(())
    }

    fn execute_non_query(&mut self, statement: &Statement) -> Result<u64> {
        self.record(statement)
    }

    fn execute_scalar(&mut self, statement: &Statement) -> Result<Value> {
        self.check_open()?;
        Ok(self
            .state
            .lock()
            .scalars
            .get(&statement.text)
            .cloned()
            .unwrap_or(Value::Null))
    }

    fn execute_reader(&mut self, statement: &Statement) -> Result<Table> {
        self.read(statement)
    }
}

impl CqlTransport for MemorySql {
    fn keyspace(&self) -> &str {
        &self.keyspace
    }

    fn execute(&mut self, statement: &Statement) -> Result<()> {
        self.record(statement).map(|_| ())
    }

    fn query(&mut self, statement: &Statement) -> Result<Table> {
        self.read(statement)
    }
}
