//! DataCom - one CRUD surface over relational databases, Redis, Etcd and Cassandra
//!
//! DataCom maps typed records onto backend-native commands: parameterized SQL
//! for relational engines, CQL for Cassandra, and JSON list mutations for
//! key-value stores that have no `WHERE`.
//!
//! # Quick Start
//!
//! ```ignore
//! use datacom::{entity, ClientConfig, DataClient};
//!
//! struct Person { id: i64, name: String }
//! entity!(Person { id: Int, name: String });
//!
//! let config = ClientConfig::from_file("datacom.toml".as_ref())?;
//! let mut client = DataClient::from_config(&config, &driver)?;
//!
//! client.insert(&Person { id: 1, name: "a".into() }, "people")?;
//! let n = client.delete(&Person { id: 1, name: "a".into() }, "people", &["id"])?;
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`] which provides a command-based API.
//! The [`DataClient`] struct provides a convenient typed interface.
//!
//! Command building, matching and batching live in the engine; only the
//! executor API is public here.

// Re-export the public API from datacom-executor
pub use datacom_executor::*;
