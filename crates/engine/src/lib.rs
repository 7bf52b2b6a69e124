//! Database engine for kvmodel
//!
//! This crate ties the lower layers into a driver-facing API:
//! - Database: named tables, shared timestamp oracle, transaction lifecycle
//! - Table: key-level reads and writes over an `ItemStore`
//! - DatabaseConfig: `kvmodel.toml` loading and validation
//!
//! # Example
//!
//! ```
//! use kvmodel_core::{Key, Timestamp};
//! use kvmodel_engine::Database;
//!
//! let db = Database::new();
//! let table = db.create_table("items").unwrap();
//! let key = Key::from("x");
//!
//! let mut txn = db.begin_transaction();
//! table.insert(&mut txn, &key, "1", false).unwrap();
//! db.commit_transaction_at(&mut txn, Timestamp::new(10)).unwrap();
//!
//! assert_eq!(table.get(&key, Timestamp::new(9)), None);
//! assert_eq!(table.get(&key, Timestamp::new(10)), Some(b"1".to_vec()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;
pub mod table;

pub use database::{Database, DatabaseConfig, CONFIG_FILE_NAME};
pub use table::Table;
