//! Per-key version chain
//!
//! A `VersionChain` holds every version record written to one key, in the
//! order the writes were admitted (not timestamp order). All traversal and
//! mutation happens under the chain's own mutex; different keys never share
//! a lock.
//!
//! # Visibility
//!
//! - A record is committed once its commit timestamp is fixed.
//! - A reader at timestamp `ts` sees the last-appended committed record with
//!   `commit_ts <= ts`. Timestamps may tie or be fixed out of order, so append
//!   order breaks ties.
//! - A transaction always sees its own most recent record on the key first
//!   (read-your-own-writes), committed or not.
//! - Uncommitted records of other transactions are never visible.
//!
//! # Records
//!
//! Records are shared through `Arc`. The chain owns their position; the
//! owning transaction keeps a weak index so it can later ask the chain to fix
//! timestamps or roll back. Only rollback removes a record.

use std::collections::VecDeque;
use std::sync::Arc;

use kvmodel_core::{Error, Result, Timestamp, TxnId, TxnView, Value};
use parking_lot::Mutex;

use crate::record::VersionRecord;

type Versions = VecDeque<Arc<VersionRecord>>;

/// Ordered version history of a single key
#[derive(Debug, Default)]
pub struct VersionChain {
    /// Records in append order, oldest at the front
    versions: Mutex<Versions>,
}

impl VersionChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            versions: Mutex::new(VecDeque::with_capacity(4)),
        }
    }

    /// Append a record after checking the write constraints
    ///
    /// The constraints are evaluated against the current logical value seen
    /// by the record's own transaction: its own latest record on this key if
    /// it has one, otherwise the latest committed record.
    ///
    /// # Errors
    /// - `NotFound` if `must_exist` and the logical value is absent
    /// - `DuplicateKey` if `must_not_exist` and the logical value is present
    ///
    /// The chain is unchanged on error.
    pub fn append(
        &self,
        record: Arc<VersionRecord>,
        must_exist: bool,
        must_not_exist: bool,
    ) -> Result<()> {
        let mut versions = self.versions.lock();
        Self::append_locked(&mut versions, record, None, must_exist, must_not_exist)
    }

    /// Append a record and fix its commit timestamp under one lock acquisition
    ///
    /// Used for auto-committed writes: no reader can observe the record before
    /// its timestamp is set.
    ///
    /// # Errors
    /// - `InvalidTimestamp` if `ts` is a sentinel
    /// - `InvalidState` if the record is already committed
    /// - `NotFound` / `DuplicateKey` as for [`append`](Self::append)
    pub fn append_committed(
        &self,
        record: Arc<VersionRecord>,
        ts: Timestamp,
        must_exist: bool,
        must_not_exist: bool,
    ) -> Result<()> {
        if !ts.is_real() {
            return Err(Error::InvalidTimestamp(ts));
        }
        let mut versions = self.versions.lock();
        Self::append_locked(&mut versions, record, Some(ts), must_exist, must_not_exist)
    }

    /// Append while the caller already holds the chain lock
    ///
    /// With `commit_ts` the record is resolved only after the constraints
    /// pass, so a rejected record is left untouched.
    fn append_locked(
        versions: &mut Versions,
        record: Arc<VersionRecord>,
        commit_ts: Option<Timestamp>,
        must_exist: bool,
        must_not_exist: bool,
    ) -> Result<()> {
        let present = Self::logical_value(versions, record.txn_id())
            .map(Value::is_present)
            .unwrap_or(false);

        if must_exist && !present {
            return Err(Error::NotFound);
        }
        if must_not_exist && present {
            return Err(Error::DuplicateKey);
        }
        if let Some(ts) = commit_ts {
            record.resolve(ts)?;
        }

        tracing::trace!(
            txn_id = record.txn_id().as_u64(),
            tombstone = record.value().is_tombstone(),
            depth = versions.len() + 1,
            "append version"
        );
        versions.push_back(record);
        Ok(())
    }

    /// Current value as seen by a writer in `txn_id`
    fn logical_value(versions: &Versions, txn_id: TxnId) -> Option<&Value> {
        Self::latest_owned(versions, txn_id)
            .or_else(|| versions.iter().rev().find(|r| r.is_committed()))
            .map(|r| r.value())
    }

    fn latest_owned(versions: &Versions, txn_id: TxnId) -> Option<&Arc<VersionRecord>> {
        versions.iter().rev().find(|r| r.is_owned_by(txn_id))
    }

    fn latest_visible(versions: &Versions, read_ts: Timestamp) -> Option<&Arc<VersionRecord>> {
        versions.iter().rev().find(|r| r.is_visible_at(read_ts))
    }

    /// Value visible to a reader at `read_ts`
    ///
    /// Returns `None` if no committed record is visible or the visible one is
    /// a tombstone. `Timestamp::LATEST` reads the last committed record.
    pub fn visible_value(&self, read_ts: Timestamp) -> Option<Vec<u8>> {
        let versions = self.versions.lock();
        Self::latest_visible(&versions, read_ts)
            .and_then(|r| r.value().as_bytes())
            .map(<[u8]>::to_vec)
    }

    /// Value visible to a transaction
    ///
    /// The transaction's own latest record wins. Otherwise this reads at the
    /// transaction's read timestamp, or `LATEST` if it has none.
    pub fn visible_value_for<T: TxnView + ?Sized>(&self, txn: &T) -> Option<Vec<u8>> {
        let versions = self.versions.lock();
        Self::latest_owned(&versions, txn.txn_id())
            .or_else(|| Self::latest_visible(&versions, txn.effective_read_timestamp()))
            .and_then(|r| r.value().as_bytes())
            .map(<[u8]>::to_vec)
    }

    /// Check whether any committed record visible at `read_ts` holds `value`
    ///
    /// Unlike [`visible_value`](Self::visible_value) this does not collapse to
    /// the single latest record. Tombstones never match.
    pub fn contains_any(&self, value: &Value, read_ts: Timestamp) -> bool {
        if value.is_tombstone() {
            return false;
        }
        let versions = self.versions.lock();
        versions
            .iter()
            .any(|r| r.is_visible_at(read_ts) && r.value() == value)
    }

    /// Fix the commit timestamp of `txn_id`'s most recent unresolved record
    ///
    /// A transaction with several records on this key needs one call per
    /// record. Calling for a transaction with no records here is a no-op.
    ///
    /// # Errors
    /// - `InvalidTimestamp` if `ts` is a sentinel
    /// - `InvalidState` if every record of `txn_id` here is already resolved
    pub fn fix_commit_timestamp(&self, txn_id: TxnId, ts: Timestamp) -> Result<()> {
        if !ts.is_real() {
            return Err(Error::InvalidTimestamp(ts));
        }
        let versions = self.versions.lock();
        let pending = versions
            .iter()
            .rev()
            .find(|r| r.is_owned_by(txn_id) && !r.is_committed());

        match pending {
            Some(record) => {
                tracing::trace!(txn_id = txn_id.as_u64(), commit_ts = ts.as_u64(), "fix commit timestamp");
                record.resolve(ts)
            }
            None if versions.iter().any(|r| r.is_owned_by(txn_id)) => Err(Error::invalid_state(
                format!("commit timestamp for {} already fixed", txn_id),
            )),
            None => Ok(()),
        }
    }

    /// Remove every record owned by `txn_id`
    ///
    /// The relative order of the remaining records is preserved. Returns the
    /// number of records removed (zero is fine).
    pub fn rollback_updates(&self, txn_id: TxnId) -> usize {
        let mut versions = self.versions.lock();
        let before = versions.len();
        versions.retain(|r| !r.is_owned_by(txn_id));
        let removed = before - versions.len();
        if removed > 0 {
            tracing::trace!(txn_id = txn_id.as_u64(), removed, "rollback updates");
        }
        removed
    }

    /// Number of records stored, committed or not
    pub fn version_count(&self) -> usize {
        self.versions.lock().len()
    }

    /// Check if the chain has no records
    pub fn is_empty(&self) -> bool {
        self.versions.lock().is_empty()
    }

    /// All records, newest first
    pub fn history(&self) -> Vec<Arc<VersionRecord>> {
        self.versions.lock().iter().rev().cloned().collect()
    }
}
