//! Transactional batch execution.
//!
//! A [`Batch`] is an ordered list of statements, each with optional hooks.
//! [`execute_batch`] runs it inside one transaction:
//!
//! ```text
//! Idle -> begin -> (before hook -> execute -> after hook) x N -> commit -> Idle
//!                        \______________ any failure ______________/
//!                                          |
//!                                       rollback -> Idle
//! ```
//!
//! A hook vetoes by returning `Err(RejectReason)`; the batch rolls back and
//! fails `CommandRejected`. Driver errors roll back and surface unchanged. An
//! empty batch never opens a transaction.

use datacom_core::{Error, HookStage, Result};
use std::fmt;
use tracing::{debug, warn};

use crate::statement::Statement;
use crate::transport::{CqlTransport, RelationalTransport};

/// Why a hook vetoed its command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectReason(pub String);

impl RejectReason {
    /// Create a new reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl From<&str> for RejectReason {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RejectReason {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a hook
pub type HookResult = std::result::Result<(), RejectReason>;

/// Runs before a command executes
pub type BeforeHook = Box<dyn FnMut() -> HookResult + Send>;

/// Runs after a command executes, with its rows affected
pub type AfterHook = Box<dyn FnMut(u64) -> HookResult + Send>;

/// One statement with its hooks.
pub struct BatchEntry {
    /// Statement to execute
    pub statement: Statement,
    before: Option<BeforeHook>,
    after: Option<AfterHook>,
}

impl BatchEntry {
    /// Entry without hooks.
    pub fn new(statement: Statement) -> Self {
        Self {
            statement,
            before: None,
            after: None,
        }
    }

    /// Builder: set the before hook.
    pub fn with_before<F>(mut self, hook: F) -> Self
    where
        F: FnMut() -> HookResult + Send + 'static,
    {
        self.before = Some(Box::new(hook));
        self
    }

    /// Builder: set the after hook.
    pub fn with_after<F>(mut self, hook: F) -> Self
    where
        F: FnMut(u64) -> HookResult + Send + 'static,
    {
        self.after = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for BatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchEntry")
            .field("statement", &self.statement)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// Ordered statements executed all-or-nothing.
///
/// ```
/// use datacom_engine::{Batch, RejectReason, Statement};
///
/// let batch = Batch::new()
///     .push(Statement::new("DELETE FROM audit"))
///     .push(Statement::new("INSERT INTO audit (id) VALUES (@id)").bind("id", 1i64))
///     .after(|rows| if rows == 1 { Ok(()) } else { Err(RejectReason::new("expected one row")) });
/// assert_eq!(batch.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Batch {
    entries: Vec<BatchEntry>,
}

impl Batch {
    /// Empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch of hook-less statements.
    pub fn from_statements<I: IntoIterator<Item = Statement>>(statements: I) -> Self {
        Self {
            entries: statements.into_iter().map(BatchEntry::new).collect(),
        }
    }

    /// Builder: append a statement.
    pub fn push(mut self, statement: Statement) -> Self {
        self.entries.push(BatchEntry::new(statement));
        self
    }

    /// Builder: append a prepared entry.
    pub fn push_entry(mut self, entry: BatchEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Builder: set the before hook of the last statement.
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: FnMut() -> HookResult + Send + 'static,
    {
        if let Some(last) = self.entries.pop() {
            self.entries.push(last.with_before(hook));
        }
        self
    }

    /// Builder: set the after hook of the last statement.
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: FnMut(u64) -> HookResult + Send + 'static,
    {
        if let Some(last) = self.entries.pop() {
            self.entries.push(last.with_after(hook));
        }
        self
    }

    /// Entries in order
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Number of statements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no statements
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Something that can run statements inside one transaction.
pub trait BatchTarget {
    /// Open the transaction.
    fn begin(&mut self) -> Result<()>;

    /// Execute one statement, returning rows affected.
    fn execute(&mut self, statement: &Statement) -> Result<u64>;

    /// Commit the transaction.
    fn commit(&mut self) -> Result<()>;

    /// Abandon the transaction.
    fn rollback(&mut self) -> Result<()>;
}

/// Execute `batch` all-or-nothing, returning the total rows affected.
pub fn execute_batch(target: &mut dyn BatchTarget, mut batch: Batch) -> Result<u64> {
    if batch.is_empty() {
        return Ok(0);
    }
    target.begin()?;
    debug!(commands = batch.len(), "batch begin");

    let outcome = run_entries(target, &mut batch).and_then(|total| {
        target.commit().map_err(|e| (batch.len(), e))?;
        Ok(total)
    });

    match outcome {
        Ok(total) => {
            debug!(commands = batch.len(), affected = total, "batch committed");
            Ok(total)
        }
        Err((index, err)) => {
            warn!(index, error = %err, "batch rolled back");
            if let Err(rollback_err) = target.rollback() {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

fn run_entries(
    target: &mut dyn BatchTarget,
    batch: &mut Batch,
) -> std::result::Result<u64, (usize, Error)> {
    let mut total = 0u64;
    for (index, entry) in batch.entries.iter_mut().enumerate() {
        let reject = |stage: HookStage, reason: RejectReason, statement: &Statement| {
            (
                index,
                Error::CommandRejected {
                    stage,
                    reason: reason.0,
                    command: statement.text.clone(),
                },
            )
        };
        if let Some(hook) = entry.before.as_mut() {
            hook().map_err(|r| reject(HookStage::Before, r, &entry.statement))?;
        }
        let affected = target.execute(&entry.statement).map_err(|e| (index, e))?;
        total += affected;
        if let Some(hook) = entry.after.as_mut() {
            hook(affected).map_err(|r| reject(HookStage::After, r, &entry.statement))?;
        }
    }
    Ok(total)
}

/// Native relational transaction.
pub struct RelationalBatch<'a> {
    transport: &'a mut dyn RelationalTransport,
}

impl<'a> RelationalBatch<'a> {
    /// Wrap a relational transport.
    pub fn new(transport: &'a mut dyn RelationalTransport) -> Self {
        Self { transport }
    }
}

impl BatchTarget for RelationalBatch<'_> {
    fn begin(&mut self) -> Result<()> {
        self.transport.begin()
    }

    fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.transport.execute_non_query(statement)
    }

    fn commit(&mut self) -> Result<()> {
        self.transport.commit()
    }

    fn rollback(&mut self) -> Result<()> {
        self.transport.rollback()
    }
}

/// CQL logged batch.
///
/// Statements are buffered and sent as one `BEGIN BATCH ... APPLY BATCH` on
/// commit. Each buffered statement counts as one row.
pub struct CqlBatch<'a> {
    transport: &'a mut dyn CqlTransport,
    pending: Vec<Statement>,
}

impl<'a> CqlBatch<'a> {
    /// Wrap a CQL transport.
    pub fn new(transport: &'a mut dyn CqlTransport) -> Self {
        Self {
            transport,
            pending: Vec::new(),
        }
    }
}

/// Combine statements into one logged batch.
pub fn logged_batch(statements: &[Statement]) -> Statement {
    let mut text = String::from("BEGIN BATCH\n");
    let mut params = Vec::new();
    for stmt in statements {
        text.push_str("  ");
        text.push_str(&stmt.text);
        text.push_str(";\n");
        params.extend(stmt.params.iter().cloned());
    }
    text.push_str("APPLY BATCH");
    Statement { text, params }
}

impl BatchTarget for CqlBatch<'_> {
    fn begin(&mut self) -> Result<()> {
        self.pending.clear();
        Ok(())
    }

    fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.pending.push(statement.clone());
        Ok(1)
    }

    fn commit(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = logged_batch(&self.pending);
        self.pending.clear();
        self.transport.execute(&batch)
    }

    fn rollback(&mut self) -> Result<()> {
        self.pending.clear();
        Ok(())
    }
}
