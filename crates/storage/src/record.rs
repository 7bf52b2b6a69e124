//! Version records
//!
//! A `VersionRecord` is one entry of a key's version chain: a value or
//! tombstone, the transaction that produced it, and a commit timestamp that
//! starts unresolved.
//!
//! The commit timestamp lives in a `OnceCell`, so "resolved exactly once" is
//! enforced by the type rather than by convention. Resolution is crate-private;
//! outside this crate it happens only through `VersionChain`.

use kvmodel_core::{Error, Result, Timestamp, TxnId, Value};
use once_cell::sync::OnceCell;

/// Immutable-after-creation entry of a version chain
#[derive(Debug)]
pub struct VersionRecord {
    value: Value,
    txn_id: TxnId,
    /// Empty until the owning transaction's commit timestamp is fixed
    commit_ts: OnceCell<Timestamp>,
}

impl VersionRecord {
    /// Create a record with an unresolved commit timestamp
    pub fn new(value: Value, txn_id: TxnId) -> Self {
        VersionRecord {
            value,
            txn_id,
            commit_ts: OnceCell::new(),
        }
    }

    /// Get the value
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Get the owning transaction
    #[inline]
    pub fn txn_id(&self) -> TxnId {
        self.txn_id
    }

    /// Get the commit timestamp, `None` while unresolved
    #[inline]
    pub fn commit_timestamp(&self) -> Option<Timestamp> {
        self.commit_ts.get().copied()
    }

    /// A record is committed once its timestamp is fixed
    #[inline]
    pub fn is_committed(&self) -> bool {
        self.commit_ts.get().is_some()
    }

    /// Check whether `txn_id` produced this record
    #[inline]
    pub fn is_owned_by(&self, txn_id: TxnId) -> bool {
        self.txn_id == txn_id
    }

    /// Committed and visible to a reader at `read_ts`
    ///
    /// `Timestamp::LATEST` sees every committed record.
    pub fn is_visible_at(&self, read_ts: Timestamp) -> bool {
        match self.commit_ts.get() {
            Some(commit_ts) => read_ts.is_latest() || *commit_ts <= read_ts,
            None => false,
        }
    }

    /// Fix the commit timestamp
    ///
    /// # Errors
    /// - `InvalidTimestamp` if `ts` is a sentinel
    /// - `InvalidState` if the timestamp was already fixed
    pub(crate) fn resolve(&self, ts: Timestamp) -> Result<()> {
        if !ts.is_real() {
            return Err(Error::InvalidTimestamp(ts));
        }
        self.commit_ts.set(ts).map_err(|_| {
            Error::invalid_state(format!(
                "commit timestamp of record from {} already fixed",
                self.txn_id
            ))
        })
    }
}
