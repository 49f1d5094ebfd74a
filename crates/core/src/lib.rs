//! Core types for DataCom
//!
//! This crate defines the foundational types shared by every backend:
//! - Value / ValueKind: attribute values and declared kinds
//! - Record / Field: ordered attribute maps
//! - Schema / Attribute: record descriptors
//! - Entity: typed records and the `entity!` macro
//! - Table: tabular results and snapshots
//! - BackendKind / OperationKind: the capability table
//! - Error: error type hierarchy

#![warn(clippy::all)]

pub mod backend;
pub mod entity;
pub mod error;
pub mod record;
pub mod schema;
pub mod table;
pub mod value;

pub use backend::{BackendKind, OperationKind, StoreFamily};
pub use entity::{Entity, FromValue};
pub use error::{Error, ErrorKind, HookStage, Result};
pub use record::{Field, Record};
pub use schema::{Attribute, Schema, SCALAR_ATTRIBUTE};
pub use table::Table;
pub use value::{Value, ValueKind};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
