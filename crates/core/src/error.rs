//! Error types for DataCom.
//!
//! All failures surfaced by the facade are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: each variant has typed fields for error details
//! - **Serializable**: they convert to and from JSON
//! - **Final**: the core never retries; every failure reaches the caller
//!
//! # Categories
//!
//! | Kind | Variants |
//! |------|----------|
//! | `InvalidSchema` | `InvalidSchema`, `InvalidKeySet` |
//! | `NullInput` | `NullRecord`, `NullDestination` |
//! | `MissingKeys` | `MissingKeys`, `EmptyKeys` |
//! | `Unsupported` | `UnsupportedOperation` |
//! | `Rejected` | `CommandRejected` |
//! | `Execution` | `ExecutionFailed`, `NotFound` |
//! | `Data` | `TypeMismatch`, `Serialization` |
//! | `Config` | `Config` |
//! | `Internal` | `Internal` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type alias for DataCom operations
pub type Result<T> = std::result::Result<T, Error>;

/// Stage of a batch at which a hook vetoed a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookStage {
    /// Hook invoked before the command executed
    Before,
    /// Hook invoked after the command executed
    After,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::Before => f.write_str("before"),
            HookStage::After => f.write_str("after"),
        }
    }
}

/// DataCom errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Schema ====================
    /// Schema cannot be used for the requested operation
    #[error("invalid schema '{schema}': {reason}")]
    InvalidSchema { schema: String, reason: String },

    /// Key set names an attribute the schema does not declare
    #[error("key '{key}' is not an attribute of '{schema}'")]
    InvalidKeySet { key: String, schema: String },

    // ==================== Missing input ====================
    /// No record supplied
    #[error("{operation}: no record supplied")]
    NullRecord { operation: String },

    /// No destination supplied
    #[error("{operation}: no destination supplied")]
    NullDestination { operation: String },

    /// Update or delete built without keys
    #[error("{operation}: key set is required")]
    MissingKeys { operation: String },

    /// Matching requested with an empty key set
    #[error("key set is empty")]
    EmptyKeys,

    // ==================== Dispatch ====================
    /// Backend does not implement the operation
    #[error("{backend} does not support {operation}")]
    UnsupportedOperation { backend: String, operation: String },

    // ==================== Batch ====================
    /// A before/after hook vetoed the batch
    #[error("[{stage} hook rejected] {reason} [command] {command}")]
    CommandRejected {
        stage: HookStage,
        reason: String,
        command: String,
    },

    /// The underlying driver failed
    #[error("execution failed: {reason}")]
    ExecutionFailed { reason: String },

    /// Nothing stored at the requested key
    #[error("not found: {key}")]
    NotFound { key: String },

    // ==================== Data ====================
    /// Stored data does not fit the declared attribute kind
    #[error("attribute '{attribute}': expected {expected}, got {actual}")]
    TypeMismatch {
        attribute: String,
        expected: String,
        actual: String,
    },

    /// Encoding or decoding failed
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    // ==================== System ====================
    /// Configuration could not be loaded or is incomplete
    #[error("config error: {reason}")]
    Config { reason: String },

    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Schema or key set misconfigured
    InvalidSchema,
    /// Required record or destination absent
    NullInput,
    /// Key-based operation without keys
    MissingKeys,
    /// Backend/operation combination not implemented
    Unsupported,
    /// Hook vetoed a batch
    Rejected,
    /// Driver failure
    Execution,
    /// Stored data could not be decoded
    Data,
    /// Configuration problem
    Config,
    /// Bug
    Internal,
}

impl Error {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidSchema { .. } | Error::InvalidKeySet { .. } => ErrorKind::InvalidSchema,
            Error::NullRecord { .. } | Error::NullDestination { .. } => ErrorKind::NullInput,
            Error::MissingKeys { .. } | Error::EmptyKeys => ErrorKind::MissingKeys,
            Error::UnsupportedOperation { .. } => ErrorKind::Unsupported,
            Error::CommandRejected { .. } => ErrorKind::Rejected,
            Error::ExecutionFailed { .. } | Error::NotFound { .. } => ErrorKind::Execution,
            Error::TypeMismatch { .. } | Error::Serialization { .. } => ErrorKind::Data,
            Error::Config { .. } => ErrorKind::Config,
            Error::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Shorthand for a driver failure.
    pub fn execution(reason: impl fmt::Display) -> Self {
        Error::ExecutionFailed {
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            reason: e.to_string(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config {
            reason: e.to_string(),
        }
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config {
            reason: e.to_string(),
        }
    }
}
