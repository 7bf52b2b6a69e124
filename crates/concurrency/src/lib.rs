//! Concurrency layer for kvmodel
//!
//! This crate implements transactions over multi-version chains:
//! - TimestampOracle: monotonic timestamps and transaction ids
//! - Transaction: writes records in place, fixes commit timestamps late,
//!   removes its records on rollback
//! - Read-your-own-writes and timestamp-based snapshot reads
//!
//! There is no commit-time validation: conditional writes are checked when
//! the record is appended, under the key's lock.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod oracle;
pub mod transaction;

pub use oracle::TimestampOracle;
pub use transaction::{Transaction, TransactionStatus};
