//! Transactions over version chains
//!
//! A `Transaction` writes version records straight into the chains of the
//! keys it touches and remembers which chains those were. It never buffers
//! writes: a record is in its chain from the moment the write succeeds, but
//! other readers cannot see it until its commit timestamp is fixed.
//!
//! # Lifecycle
//!
//! ```text
//! Active ──commit(ts)──▶ Committed
//!    │
//!    └────rollback()───▶ Aborted
//! ```
//!
//! Both terminal states are final. `commit` fixes the commit timestamp of
//! every record the transaction produced before it reports `Committed`.
//! `rollback` removes every such record from its chain.
//!
//! # Errors
//!
//! Constraint violations (`NotFound`, `DuplicateKey`) leave the transaction
//! `Active`; the caller chooses to retry or roll back. Anything on a
//! terminal transaction is `InvalidState`.

use std::sync::{Arc, Weak};

use kvmodel_core::{Error, Result, Timestamp, TxnId, TxnView, Value};
use kvmodel_storage::{VersionChain, VersionRecord};
use rustc_hash::FxHashSet;

use crate::oracle::TimestampOracle;

/// Status of a transaction in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Transaction is executing, can read/write
    Active,
    /// Commit timestamp fixed on every record
    Committed,
    /// Every record removed from its chain
    Aborted,
}

/// A write made by this transaction
///
/// The chain owns the record; the transaction only keeps a weak index to it.
#[derive(Debug)]
struct PendingWrite {
    chain: Arc<VersionChain>,
    record: Weak<VersionRecord>,
}

/// A transaction writing into version chains
#[derive(Debug)]
pub struct Transaction {
    id: TxnId,
    status: TransactionStatus,
    /// `NONE` reads as `LATEST`
    read_ts: Timestamp,
    commit_ts: Option<Timestamp>,
    /// One entry per successful write, in write order
    writes: Vec<PendingWrite>,
    rollback_on_drop: bool,
}

impl Transaction {
    /// Create an active transaction with an explicit id
    ///
    /// Drivers normally use [`begin`](Self::begin) instead.
    pub fn new(id: TxnId, read_ts: Timestamp) -> Self {
        Transaction {
            id,
            status: TransactionStatus::Active,
            read_ts,
            commit_ts: None,
            writes: Vec::new(),
            rollback_on_drop: true,
        }
    }

    /// Begin a transaction without a read timestamp
    pub fn begin(oracle: &TimestampOracle) -> Self {
        Self::begin_at(oracle, Timestamp::NONE)
    }

    /// Begin a transaction reading at `read_ts`
    pub fn begin_at(oracle: &TimestampOracle, read_ts: Timestamp) -> Self {
        let txn = Self::new(oracle.next_txn_id(), read_ts);
        tracing::debug!(txn_id = txn.id.as_u64(), read_ts = %read_ts, "begin transaction");
        txn
    }

    /// Choose whether dropping an active transaction rolls it back
    ///
    /// Enabled by default. When disabled, an abandoned transaction leaves its
    /// uncommitted records in their chains, where no other reader sees them.
    pub fn set_rollback_on_drop(&mut self, enabled: bool) {
        self.rollback_on_drop = enabled;
    }

    // === Accessors ===

    /// Transaction id
    pub fn id(&self) -> TxnId {
        self.id
    }

    /// Current status
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Read timestamp, `NONE` if unset
    pub fn read_timestamp(&self) -> Timestamp {
        self.read_ts
    }

    /// Commit timestamp, set once committed
    pub fn commit_timestamp(&self) -> Option<Timestamp> {
        self.commit_ts
    }

    /// Check if transaction is active
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    /// Check if transaction committed
    pub fn is_committed(&self) -> bool {
        self.status == TransactionStatus::Committed
    }

    /// Check if transaction aborted
    pub fn is_aborted(&self) -> bool {
        self.status == TransactionStatus::Aborted
    }

    /// Number of records written so far
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Check if the transaction made no writes
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    /// Set or change the read timestamp
    ///
    /// `Timestamp::NONE` clears it, so reads fall back to `LATEST`.
    ///
    /// # Errors
    /// `InvalidState` if the transaction is not active.
    pub fn set_read_timestamp(&mut self, read_ts: Timestamp) -> Result<()> {
        self.ensure_active()?;
        self.read_ts = read_ts;
        Ok(())
    }

    /// Ensure transaction is in Active state
    ///
    /// # Errors
    /// `InvalidState` if committed or aborted.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::invalid_state(format!(
                "transaction {} is not active: {:?}",
                self.id, self.status
            )))
        }
    }

    // === Write Operations ===

    /// Write `value` into `chain` under the given constraints
    ///
    /// On success the record is in the chain and this transaction tracks it.
    ///
    /// # Errors
    /// - `InvalidState` if the transaction is not active
    /// - `NotFound` / `DuplicateKey` from the chain; the transaction stays active
    pub fn operate(
        &mut self,
        chain: &Arc<VersionChain>,
        value: Value,
        must_exist: bool,
        must_not_exist: bool,
    ) -> Result<()> {
        self.ensure_active()?;

        let record = Arc::new(VersionRecord::new(value, self.id));
        chain.append(Arc::clone(&record), must_exist, must_not_exist)?;

        self.writes.push(PendingWrite {
            chain: Arc::clone(chain),
            record: Arc::downgrade(&record),
        });
        Ok(())
    }

    /// Insert a value; fails with `DuplicateKey` if present unless `overwrite`
    pub fn insert(
        &mut self,
        chain: &Arc<VersionChain>,
        value: impl Into<Vec<u8>>,
        overwrite: bool,
    ) -> Result<()> {
        self.operate(chain, Value::Bytes(value.into()), false, !overwrite)
    }

    /// Replace an existing value; fails with `NotFound` if absent
    pub fn update(&mut self, chain: &Arc<VersionChain>, value: impl Into<Vec<u8>>) -> Result<()> {
        self.operate(chain, Value::Bytes(value.into()), true, false)
    }

    /// Write a tombstone; fails with `NotFound` if absent
    pub fn remove(&mut self, chain: &Arc<VersionChain>) -> Result<()> {
        self.operate(chain, Value::Tombstone, true, false)
    }

    // === Read Operations ===

    /// Read `chain` as this transaction sees it
    ///
    /// This transaction's own latest write wins; otherwise the value
    /// committed as of the read timestamp.
    pub fn get(&self, chain: &VersionChain) -> Option<Vec<u8>> {
        chain.visible_value_for(self)
    }

    // === Commit / Rollback ===

    /// Fix `commit_ts` on every record and move to `Committed`
    ///
    /// A transaction without writes commits trivially. Every record is
    /// checked before any timestamp is fixed, so a failed commit leaves all
    /// records unresolved and the transaction still `Active`.
    ///
    /// # Errors
    /// - `InvalidState` if the transaction is not active, or one of its
    ///   records was already fixed or removed from its chain
    /// - `InvalidTimestamp` if `commit_ts` is a sentinel
    pub fn commit(&mut self, commit_ts: Timestamp) -> Result<()> {
        self.ensure_active()?;
        if !commit_ts.is_real() {
            return Err(Error::InvalidTimestamp(commit_ts));
        }
        self.ensure_writes_pending()?;

        for write in &self.writes {
            write.chain.fix_commit_timestamp(self.id, commit_ts)?;
        }
        debug_assert!(self
            .writes
            .iter()
            .filter_map(|w| w.record.upgrade())
            .all(|r| r.commit_timestamp() == Some(commit_ts)));

        self.status = TransactionStatus::Committed;
        self.commit_ts = Some(commit_ts);
        tracing::debug!(
            txn_id = self.id.as_u64(),
            commit_ts = commit_ts.as_u64(),
            writes = self.writes.len(),
            "commit transaction"
        );
        Ok(())
    }

    /// Remove every record of this transaction and move to `Aborted`
    ///
    /// Rolling back an aborted transaction is a no-op.
    ///
    /// # Errors
    /// `InvalidState` if the transaction already committed.
    pub fn rollback(&mut self) -> Result<()> {
        match self.status {
            TransactionStatus::Aborted => return Ok(()),
            TransactionStatus::Committed => {
                return Err(Error::invalid_state(format!(
                    "cannot roll back committed transaction {}",
                    self.id
                )))
            }
            TransactionStatus::Active => {}
        }

        let removed = self.rollback_chains();
        self.writes.clear();
        self.status = TransactionStatus::Aborted;
        tracing::debug!(txn_id = self.id.as_u64(), removed, "rollback transaction");
        Ok(())
    }

    /// Every written record is still in its chain and unresolved
    fn ensure_writes_pending(&self) -> Result<()> {
        for write in &self.writes {
            match write.record.upgrade() {
                None => {
                    return Err(Error::invalid_state(format!(
                        "a record of transaction {} was removed from its chain",
                        self.id
                    )))
                }
                Some(record) if record.is_committed() => {
                    return Err(Error::invalid_state(format!(
                        "commit timestamp for {} already fixed",
                        self.id
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Call `rollback_updates` once per distinct chain
    fn rollback_chains(&self) -> usize {
        let mut visited: FxHashSet<*const VersionChain> = FxHashSet::default();
        self.writes
            .iter()
            .filter(|write| visited.insert(Arc::as_ptr(&write.chain)))
            .map(|write| write.chain.rollback_updates(self.id))
            .sum()
    }
}

impl TxnView for Transaction {
    fn txn_id(&self) -> TxnId {
        self.id
    }

    fn read_timestamp(&self) -> Timestamp {
        self.read_ts
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.is_active() && self.rollback_on_drop && !self.writes.is_empty() {
            tracing::warn!(
                txn_id = self.id.as_u64(),
                writes = self.writes.len(),
                "active transaction dropped, rolling back"
            );
            // Cannot fail from Active
            let _ = self.rollback();
        }
    }
}
