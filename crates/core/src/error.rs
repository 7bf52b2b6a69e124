//! Error types for kvmodel
//!
//! This module defines all error types used throughout the model.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Errors fall into two groups:
//! - Constraint violations (`NotFound`, `DuplicateKey`): expected outcomes of a
//!   conditional write. The transaction stays active and the caller decides
//!   whether to retry or roll back.
//! - State violations (`InvalidState`, `InvalidTimestamp`): programming errors
//!   such as committing twice. Callers should not try to recover from these.

use crate::types::Timestamp;
use thiserror::Error;

/// Result type alias for kvmodel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the kvmodel engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A write required the key to exist, but its current logical value is absent
    #[error("Key not found")]
    NotFound,

    /// A write required the key to be absent, but its current logical value is present
    #[error("Duplicate key")]
    DuplicateKey,

    /// Operation not allowed in the current transaction or record state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A sentinel timestamp was supplied where a real one is required
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(Timestamp),

    /// The oracle issued every timestamp below the `LATEST` sentinel
    #[error("Timestamps exhausted")]
    TimestampsExhausted,

    /// A table with this name already exists
    #[error("Table already exists: {0}")]
    TableExists(String),

    /// No table with this name exists
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an `InvalidState` error from any message
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }

    /// True for the recoverable conditional-write failures
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Error::NotFound | Error::DuplicateKey)
    }

    /// True for errors that indicate misuse of a transaction or record
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::InvalidState(_) | Error::InvalidTimestamp(_))
    }
}
