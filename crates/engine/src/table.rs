//! Named tables
//!
//! A `Table` pairs a name with an `ItemStore` and exposes the key-level
//! operations a model driver needs: transactional writes and reads, reads at
//! a timestamp, history membership checks, and auto-committed writes.
//!
//! Reads never create chains; only writes do.

use std::sync::Arc;

use kvmodel_concurrency::{TimestampOracle, Transaction};
use kvmodel_core::{Key, Result, Timestamp, Value};
use kvmodel_storage::{ItemStore, VersionChain, VersionRecord};

/// A named key/value table
pub struct Table {
    name: String,
    items: ItemStore,
}

impl Table {
    /// Create an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            items: ItemStore::new(),
        }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying key to chain map
    pub fn items(&self) -> &ItemStore {
        &self.items
    }

    /// Chain for `key`, created on first use
    pub fn chain(&self, key: &Key) -> Arc<VersionChain> {
        self.items.get_or_create_chain(key)
    }

    // === Transactional writes ===

    /// Insert `value`; `DuplicateKey` if present unless `overwrite`
    pub fn insert(
        &self,
        txn: &mut Transaction,
        key: &Key,
        value: impl Into<Vec<u8>>,
        overwrite: bool,
    ) -> Result<()> {
        txn.insert(&self.chain(key), value, overwrite)
    }

    /// Replace an existing value; `NotFound` if absent
    pub fn update(&self, txn: &mut Transaction, key: &Key, value: impl Into<Vec<u8>>) -> Result<()> {
        txn.update(&self.chain(key), value)
    }

    /// Delete an existing value; `NotFound` if absent
    pub fn remove(&self, txn: &mut Transaction, key: &Key) -> Result<()> {
        txn.remove(&self.chain(key))
    }

    // === Reads ===

    /// Value visible at `read_ts` (`Timestamp::LATEST` for the newest)
    pub fn get(&self, key: &Key, read_ts: Timestamp) -> Option<Vec<u8>> {
        self.items
            .chain(key)
            .and_then(|chain| chain.visible_value(read_ts))
    }

    /// Value visible to `txn`, including its own uncommitted writes
    pub fn get_for(&self, txn: &Transaction, key: &Key) -> Option<Vec<u8>> {
        self.items.chain(key).and_then(|chain| txn.get(&chain))
    }

    /// Whether any committed value of `key` visible at `read_ts` equals `value`
    pub fn contains_any(&self, key: &Key, value: &Value, read_ts: Timestamp) -> bool {
        self.items
            .chain(key)
            .map(|chain| chain.contains_any(value, read_ts))
            .unwrap_or(false)
    }

    // === Auto-commit ===

    /// Write outside an explicit transaction
    ///
    /// Draws a fresh transaction id and commit timestamp from `oracle` and
    /// appends the record already committed, so no reader ever sees it
    /// unresolved. Returns the commit timestamp.
    pub fn write_autocommit(
        &self,
        oracle: &TimestampOracle,
        key: &Key,
        value: Value,
        must_exist: bool,
        must_not_exist: bool,
    ) -> Result<Timestamp> {
        let record = Arc::new(VersionRecord::new(value, oracle.next_txn_id()));
        let commit_ts = oracle.next_timestamp()?;
        self.chain(key)
            .append_committed(record, commit_ts, must_exist, must_not_exist)?;
        Ok(commit_ts)
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("keys", &self.items.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvmodel_core::Error;

    #[test]
    fn test_reads_do_not_create_chains() {
        let table = Table::new("t");
        assert_eq!(table.get(&Key::from("x"), Timestamp::LATEST), None);
        assert!(!table.contains_any(&Key::from("x"), &Value::from("1"), Timestamp::LATEST));
        assert!(table.items().is_empty());
    }

    #[test]
    fn test_transactional_round() {
        let oracle = TimestampOracle::new();
        let table = Table::new("t");
        let x = Key::from("x");

        let mut txn = Transaction::begin(&oracle);
        table.insert(&mut txn, &x, "1", false).unwrap();
        assert_eq!(table.get_for(&txn, &x), Some(b"1".to_vec()));
        assert_eq!(table.get(&x, Timestamp::LATEST), None);
        txn.commit(Timestamp::new(10)).unwrap();

        assert_eq!(table.get(&x, Timestamp::new(10)), Some(b"1".to_vec()));
        assert!(table.contains_any(&x, &Value::from("1"), Timestamp::new(10)));
    }

    #[test]
    fn test_update_and_remove_missing_key() {
        let oracle = TimestampOracle::new();
        let table = Table::new("t");
        let mut txn = Transaction::begin(&oracle);
        assert_eq!(table.update(&mut txn, &Key::from("x"), "1"), Err(Error::NotFound));
        assert_eq!(table.remove(&mut txn, &Key::from("x")), Err(Error::NotFound));
        assert!(txn.is_active());
    }

    #[test]
    fn test_write_autocommit() {
        let oracle = TimestampOracle::new();
        let table = Table::new("t");
        let x = Key::from("x");

        let t1 = table
            .write_autocommit(&oracle, &x, Value::from("1"), false, true)
            .unwrap();
        assert_eq!(table.get(&x, t1), Some(b"1".to_vec()));

        assert_eq!(
            table.write_autocommit(&oracle, &x, Value::from("2"), false, true),
            Err(Error::DuplicateKey)
        );

        let t2 = table
            .write_autocommit(&oracle, &x, Value::Tombstone, true, false)
            .unwrap();
        assert!(t2 > t1);
        assert_eq!(table.get(&x, t2), None);
        assert_eq!(table.get(&x, t1), Some(b"1".to_vec()));
    }
}
