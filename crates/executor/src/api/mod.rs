//! High-level typed wrapper for the Executor.
//!
//! The [`DataClient`] struct provides a typed Rust API over the [`Executor`]
//! and [`Command`]/[`Output`] enums. Records cross the boundary as
//! [`Entity`](datacom_core::Entity) values; keys are attribute names.
//!
//! Every call is one open, execute, close cycle on the client's connection.
//! The client keeps nothing between calls.
//!
//! # Example
//!
//! ```
//! use datacom_executor::{entity, DataClient, MemoryKv};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Person {
//!     id: i64,
//!     name: String,
//! }
//! entity!(Person { id: Int, name: String });
//!
//! let mut client = DataClient::new(MemoryKv::redis());
//! client.insert(&Person { id: 1, name: "a".into() }, "people").unwrap();
//! client.update(&Person { id: 1, name: "b".into() }, "people", &["id"]).unwrap();
//!
//! let people: Vec<Person> = client.fetch_range("people", 0, -1).unwrap();
//! assert_eq!(people, vec![Person { id: 1, name: "b".into() }]);
//! ```

mod kv;
mod raw;
mod read;
mod write;

use datacom_core::BackendKind;
use datacom_engine::Connection;

use crate::config::{ClientConfig, ConnectionFactory};
use crate::{Command, Executor, Output, Result};

/// Typed access to one backend.
///
/// `DataClient` exclusively owns its connection. Calls take `&mut self`;
/// share a client across threads behind a lock, or give each thread its own.
pub struct DataClient {
    connection: Box<dyn Connection>,
    executor: Executor,
}

impl DataClient {
    /// Wrap a connection.
    pub fn new(connection: impl Connection + 'static) -> Self {
        Self::from_boxed(Box::new(connection))
    }

    /// Wrap an already boxed connection.
    pub fn from_boxed(connection: Box<dyn Connection>) -> Self {
        Self {
            connection,
            executor: Executor::new(),
        }
    }

    /// Validate `config` and build a client from `factory`.
    ///
    /// # Example
    ///
    /// ```
    /// use datacom_executor::{BackendKind, ClientConfig, Connection, DataClient, MemoryKv, Result};
    ///
    /// let factory = |_: &ClientConfig| -> Result<Box<dyn Connection>> {
    ///     Ok(Box::new(MemoryKv::redis()))
    /// };
    /// let config = ClientConfig::new(BackendKind::Redis).host("cache");
    /// let client = DataClient::from_config(&config, &factory).unwrap();
    /// assert_eq!(client.backend(), BackendKind::Redis);
    /// ```
    pub fn from_config(config: &ClientConfig, factory: &dyn ConnectionFactory) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_boxed(factory.connect(config)?))
    }

    /// Backend this client talks to.
    pub fn backend(&self) -> BackendKind {
        self.connection.backend()
    }

    /// Execute a raw [`Command`].
    ///
    /// The escape hatch for callers that build commands themselves.
    pub fn execute(&mut self, cmd: Command) -> Result<Output> {
        self.executor.execute(self.connection.as_mut(), cmd)
    }
}

impl std::fmt::Debug for DataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataClient")
            .field("backend", &self.backend())
            .finish()
    }
}
