//! The Executor - dispatch table for DataCom commands.
//!
//! The Executor is a stateless dispatcher: it checks the backend's capability
//! table, opens the connection, routes the command to the handler for the
//! backend's store family and closes the connection on every exit path.

use datacom_core::StoreFamily;
use datacom_engine::{with_connection, Connection};
use tracing::debug;

use crate::handlers;
use crate::{Command, Output, Result};

/// The command executor.
///
/// The Executor is **stateless**: it owns nothing and can be shared freely.
/// All state lives behind the connection passed to each call.
///
/// # Example
///
/// ```
/// use datacom_executor::{Command, Executor, MemoryKv, Output};
///
/// let executor = Executor::new();
/// let mut conn = MemoryKv::redis();
///
/// let out = executor.execute(&mut conn, Command::Ping).unwrap();
/// assert!(matches!(out, Output::Pong { .. }));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Executor;

impl Executor {
    /// Create a new executor.
    pub fn new() -> Self {
        Self
    }

    /// Execute a single command against `conn`.
    ///
    /// Unsupported backend/operation pairs fail before the connection is
    /// opened.
    pub fn execute(&self, conn: &mut dyn Connection, cmd: Command) -> Result<Output> {
        let backend = conn.backend();
        let operation = cmd.operation();
        backend.require(operation)?;
        debug!(
            backend = %backend,
            operation = %operation,
            "dispatching command"
        );

        with_connection(conn, |conn| match cmd {
            Command::Ping => Ok(Output::Pong {
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
            cmd => match backend.family() {
                StoreFamily::Relational => handlers::relational::handle(conn, cmd),
                StoreFamily::KeyValueList => handlers::list::handle(conn, cmd),
                StoreFamily::WideColumn => handlers::wide_column::handle(conn, cmd),
            },
        })
    }

    /// Execute several commands in order.
    ///
    /// Each command runs in its own open/close cycle. A failure does not stop
    /// the remaining commands; results keep the input order.
    pub fn execute_many(&self, conn: &mut dyn Connection, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(conn, cmd)).collect()
    }
}
