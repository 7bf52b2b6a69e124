//! Database: named tables sharing one timestamp oracle
//!
//! The `Database` is the driver-facing entry point. It owns the oracle,
//! creates and looks up tables, and starts, commits and rolls back
//! transactions. Tables hold the data; transactions hold the bookkeeping.
//!
//! ## Commit timestamps
//!
//! `commit_transaction` draws the commit timestamp from the oracle.
//! `commit_transaction_at` lets the caller pick one (for replaying a known
//! schedule) and advances the oracle past it so later timestamps stay ahead.

pub mod config;

pub use config::{DatabaseConfig, CONFIG_FILE_NAME};

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use kvmodel_concurrency::{TimestampOracle, Transaction};
use kvmodel_core::{Error, Result, Timestamp};
use tracing::{debug, info, warn};

use crate::table::Table;

/// In-memory multi-version database
pub struct Database {
    config: DatabaseConfig,
    oracle: TimestampOracle,
    tables: DashMap<String, Arc<Table>>,
}

impl Database {
    /// Create a database with default configuration
    pub fn new() -> Self {
        Database::build(DatabaseConfig::default())
    }

    /// Create a database from a validated configuration
    pub fn with_config(config: DatabaseConfig) -> Result<Self> {
        config.validate()?;
        Ok(Database::build(config))
    }

    /// Create a database from a `kvmodel.toml` file
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let config = DatabaseConfig::from_file(path)?;
        info!(target: "kvmodel::db", path = %path.display(), "Loaded database config");
        Ok(Database::build(config))
    }

    fn build(config: DatabaseConfig) -> Self {
        let oracle = TimestampOracle::with_start(config.initial_timestamp, config.initial_txn_id);
        Database {
            config,
            oracle,
            tables: DashMap::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Timestamp oracle shared by every table
    pub fn oracle(&self) -> &TimestampOracle {
        &self.oracle
    }

    /// Most recently issued timestamp
    pub fn current_timestamp(&self) -> Timestamp {
        self.oracle.current_timestamp()
    }

    // ========================================================================
    // Tables
    // ========================================================================

    /// Create an empty table
    ///
    /// # Errors
    /// `TableExists` if the name is taken.
    pub fn create_table(&self, name: &str) -> Result<Arc<Table>> {
        use dashmap::mapref::entry::Entry;

        match self.tables.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::TableExists(name.to_string())),
            Entry::Vacant(slot) => {
                let table = Arc::new(Table::new(name));
                slot.insert(Arc::clone(&table));
                debug!(target: "kvmodel::db", table = name, "Created table");
                Ok(table)
            }
        }
    }

    /// Look up a table by name
    ///
    /// # Errors
    /// `TableNotFound` if no table has that name.
    pub fn table(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .get(name)
            .map(|t| Arc::clone(t.value()))
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Table names, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Begin a transaction that reads the newest data
    pub fn begin_transaction(&self) -> Transaction {
        self.configure(Transaction::begin(&self.oracle))
    }

    /// Begin a transaction that reads as of `read_ts`
    pub fn begin_transaction_at(&self, read_ts: Timestamp) -> Transaction {
        self.configure(Transaction::begin_at(&self.oracle, read_ts))
    }

    fn configure(&self, mut txn: Transaction) -> Transaction {
        txn.set_rollback_on_drop(self.config.rollback_on_drop);
        txn
    }

    /// Commit with a fresh timestamp from the oracle
    ///
    /// Returns the commit timestamp.
    pub fn commit_transaction(&self, txn: &mut Transaction) -> Result<Timestamp> {
        txn.ensure_active()?;
        let commit_ts = self.oracle.next_timestamp()?;
        txn.commit(commit_ts)?;
        Ok(commit_ts)
    }

    /// Commit with a caller-chosen timestamp
    ///
    /// The oracle is advanced past `commit_ts` once the commit succeeds.
    pub fn commit_transaction_at(&self, txn: &mut Transaction, commit_ts: Timestamp) -> Result<()> {
        txn.commit(commit_ts)?;
        self.oracle.observe(commit_ts);
        Ok(())
    }

    /// Roll back a transaction, removing all its records
    pub fn rollback_transaction(&self, txn: &mut Transaction) -> Result<()> {
        txn.rollback()
    }

    /// Run `f` inside a transaction
    ///
    /// Commits with an oracle timestamp if `f` returns `Ok`, rolls back
    /// otherwise. Returns `f`'s value with the commit timestamp.
    ///
    /// # Example
    /// ```
    /// use kvmodel_core::Key;
    /// use kvmodel_engine::Database;
    ///
    /// let db = Database::new();
    /// let accounts = db.create_table("accounts").unwrap();
    /// let key = Key::from("alice");
    ///
    /// let (_, ts) = db
    ///     .transaction(|txn| accounts.insert(txn, &key, "100", false))
    ///     .unwrap();
    /// assert_eq!(accounts.get(&key, ts), Some(b"100".to_vec()));
    /// ```
    pub fn transaction<F, T>(&self, f: F) -> Result<(T, Timestamp)>
    where
        F: FnOnce(&mut Transaction) -> Result<T>,
    {
        let mut txn = self.begin_transaction();
        match f(&mut txn) {
            Ok(value) => {
                let commit_ts = self.commit_transaction(&mut txn)?;
                Ok((value, commit_ts))
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback() {
                    warn!(
                        target: "kvmodel::db",
                        txn_id = txn.id().as_u64(),
                        error = %rollback_err,
                        "Rollback after failed transaction body also failed"
                    );
                }
                Err(e)
            }
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("tables", &self.table_names())
            .field("current_timestamp", &self.current_timestamp())
            .finish()
    }
}
