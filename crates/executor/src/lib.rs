//! # DataCom Executor
//!
//! The public API for DataCom - one CRUD surface over relational databases,
//! Redis, Etcd and Cassandra.
//!
//! This is the only crate users need to import. It provides:
//! - [`DataClient`] - Typed operations over [`Entity`] records
//! - [`Command`]/[`Output`] - Low-level command interface
//! - [`ClientConfig`]/[`ConnectionFactory`] - Configuration and driver hookup
//!
//! ## Quick Start
//!
//! ```text
//! use datacom_executor::{entity, ClientConfig, DataClient};
//!
//! struct Person { id: i64, name: String }
//! entity!(Person { id: Int, name: String });
//!
//! let config = ClientConfig::from_file("datacom.toml".as_ref())?;
//! let mut client = DataClient::from_config(&config, &driver)?;
//!
//! client.insert(&Person { id: 1, name: "a".into() }, "people")?;
//! client.update(&Person { id: 1, name: "b".into() }, "people", &["id"])?;
//! ```
//!
//! ## Backends
//!
//! | Family | Backends | Records live in |
//! |--------|----------|-----------------|
//! | **Relational** | SQL Server, ODBC, OLE DB, SQLite, PostgreSQL, MySQL | Tables, via parameterized SQL |
//! | **Key-value list** | Redis, Etcd | JSON entries of a list under a key |
//! | **Wide column** | Cassandra | Tables, via CQL |

#![warn(missing_docs)]

mod api;
mod command;
mod config;
mod executor;
mod output;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use api::DataClient;
pub use command::{Command, TableSource};
pub use config::{ClientConfig, ConnectionFactory, CONFIG_FILE_NAME};
pub use executor::Executor;
pub use output::Output;

// Re-export the data model so users don't need datacom-core directly
pub use datacom_core::{
    entity, Attribute, BackendKind, Entity, Error, ErrorKind, Field, FromValue, HookStage,
    OperationKind, Record, Result, Schema, StoreFamily, Table, Value, ValueKind, SCALAR_ATTRIBUTE,
};

// Re-export engine types used to build commands and plug in drivers
pub use datacom_engine::{
    Batch, BatchEntry, Connection, CqlTransport, ListTransport, MemoryKv, MemorySql, Param,
    RejectReason, RelationalTransport, Statement,
};
