//! Shared helpers for the integration suites.
//! Import via `mod common;`.

#![allow(dead_code)]

use std::sync::Once;

use kvmodel::{Database, Key, Table, Timestamp};
use std::sync::Arc;

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness writer.
///
/// Set `RUST_LOG`-style filtering with `KVMODEL_TEST_LOG=debug`.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let level = std::env::var("KVMODEL_TEST_LOG")
            .ok()
            .and_then(|v| v.parse::<tracing::Level>().ok())
            .unwrap_or(tracing::Level::WARN);
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .try_init();
    });
}

/// Fresh database with one table named `items`.
pub fn db_with_table() -> (Database, Arc<Table>) {
    init_tracing();
    let db = Database::new();
    let table = db.create_table("items").unwrap();
    (db, table)
}

pub fn ts(t: u64) -> Timestamp {
    Timestamp::new(t)
}

pub fn key(name: &str) -> Key {
    Key::from(name)
}
