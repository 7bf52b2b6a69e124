//! kvmodel - reference multi-version key/value model
//!
//! Each key keeps an ordered chain of versions. Transactions write records
//! into chains immediately and fix their commit timestamp late, at commit.
//! Readers pick the newest record committed at or before their read
//! timestamp, or their own uncommitted writes.
//!
//! # Quick Start
//!
//! ```
//! use kvmodel::{Database, Key, Timestamp, Value};
//!
//! let db = Database::new();
//! let table = db.create_table("items").unwrap();
//! let x = Key::from("x");
//!
//! let mut a = db.begin_transaction();
//! table.insert(&mut a, &x, "1", false).unwrap();
//! db.commit_transaction_at(&mut a, Timestamp::new(10)).unwrap();
//!
//! let mut b = db.begin_transaction();
//! table.update(&mut b, &x, "2").unwrap();
//! db.commit_transaction_at(&mut b, Timestamp::new(20)).unwrap();
//!
//! assert_eq!(table.get(&x, Timestamp::new(15)), Some(b"1".to_vec()));
//! assert_eq!(table.get(&x, Timestamp::new(25)), Some(b"2".to_vec()));
//! assert!(table.contains_any(&x, &Value::from("1"), Timestamp::new(25)));
//! ```
//!
//! # Layers
//!
//! - [`kvmodel_core`]: timestamps, ids, keys, values, errors
//! - [`kvmodel_storage`]: version records, chains, the key to chain map
//! - [`kvmodel_concurrency`]: timestamp oracle and transactions
//! - [`kvmodel_engine`]: database, tables, configuration

pub use kvmodel_concurrency::{TimestampOracle, Transaction, TransactionStatus};
pub use kvmodel_core::{Error, Key, Result, Timestamp, TxnId, TxnView, Value};
pub use kvmodel_engine::{Database, DatabaseConfig, Table, CONFIG_FILE_NAME};
pub use kvmodel_storage::{ItemStore, VersionChain, VersionRecord};
