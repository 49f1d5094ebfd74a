//! Mapping and execution engine for DataCom
//!
//! This crate turns records into backend-native commands and runs them:
//! - Transport contracts: Connection plus one role trait per store family
//! - Command builder: SQL, CQL and key-value list commands from a schema
//! - Matcher: key matching and list mutation for stores without `WHERE`
//! - Diff: snapshot reconciliation into inserts and deletes
//! - Batch: all-or-nothing execution with before/after hooks
//! - Codec: JSON payloads for key-value stores
//! - Memory: in-memory transports
//!
//! The engine holds no state between calls. Everything it builds lives for
//! one operation.

#![warn(clippy::all)]

pub mod batch;
pub mod builder;
pub mod codec;
pub mod diff;
pub mod matcher;
pub mod memory;
pub mod statement;
pub mod transport;

pub use batch::{
    execute_batch, logged_batch, AfterHook, Batch, BatchEntry, BatchTarget, BeforeHook, CqlBatch,
    HookResult, RejectReason, RelationalBatch,
};
pub use builder::{build_row_delete, build_row_insert, cql_literal, CommandBuilder, Dialect};
pub use diff::{reconcile, Reconciliation};
pub use matcher::{apply_mutation, find_matches, matches, records_equal};
pub use memory::{MemoryKv, MemorySql};
pub use statement::{qualified, select_all, ListMutation, NativeCommand, Param, Statement, WriteKind};
pub use transport::{
    resolve_range, with_connection, Connection, CqlTransport, ListTransport, RelationalTransport,
};
