//! Storage layer for kvmodel
//!
//! This crate implements the in-memory multi-version store:
//! - VersionRecord: value or tombstone with a once-only commit timestamp
//! - VersionChain: per-key ordered history with its own lock
//! - ItemStore: DashMap from key to chain
//!
//! Nothing here is durable. Obsolete versions are never collected; a chain
//! keeps every committed record so readers at any timestamp stay answerable.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chain;
pub mod item_store;
pub mod record;

pub use chain::VersionChain;
pub use item_store::ItemStore;
pub use record::VersionRecord;
