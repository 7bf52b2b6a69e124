//! Core types and traits for kvmodel
//!
//! This crate defines the foundational types used throughout the model:
//! - Timestamp: Logical commit/read time with `NONE` and `LATEST` sentinels
//! - TxnId: Transaction identifier
//! - Key: Opaque byte key
//! - Value: Payload bytes or tombstone
//! - Error: Constraint and state violations
//! - Traits: `TxnView`, the reader-side view of a transaction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use traits::TxnView;
pub use types::{Key, Timestamp, TxnId};
pub use value::Value;
