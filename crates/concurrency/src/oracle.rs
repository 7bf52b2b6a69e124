//! Timestamp oracle
//!
//! Hands out strictly increasing commit/read timestamps and transaction ids.
//! There is no process-wide instance: the driver creates one and passes it
//! around, and everything else reads the counters through this interface.

use kvmodel_core::{Error, Result, Timestamp, TxnId};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of timestamps and transaction ids
///
/// Both counters start at 1 by default since 0 is the `NONE` sentinel for
/// both types. Timestamps never reach `u64::MAX`, the `LATEST` sentinel: once
/// `u64::MAX - 1` has been issued the oracle is exhausted.
#[derive(Debug)]
pub struct TimestampOracle {
    /// Next timestamp to hand out
    next_ts: AtomicU64,

    /// Next transaction id to hand out
    next_txn_id: AtomicU64,
}

impl TimestampOracle {
    /// Create an oracle whose first timestamp and first txn id are both 1
    pub fn new() -> Self {
        Self::with_start(1, 1)
    }

    /// Create an oracle with explicit starting values
    ///
    /// Values of 0 are raised to 1 so the `NONE` sentinels are never issued.
    pub fn with_start(initial_ts: u64, initial_txn_id: u64) -> Self {
        TimestampOracle {
            next_ts: AtomicU64::new(initial_ts.max(1)),
            next_txn_id: AtomicU64::new(initial_txn_id.max(1)),
        }
    }

    /// Allocate the next timestamp
    ///
    /// # Errors
    /// `TimestampsExhausted` if every timestamp below `LATEST` was issued.
    pub fn next_timestamp(&self) -> Result<Timestamp> {
        // Counter value u64::MAX means exhausted; it is never handed out
        self.next_ts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| {
                (next < u64::MAX).then(|| next + 1)
            })
            .map(Timestamp::new)
            .map_err(|_| Error::TimestampsExhausted)
    }

    /// Allocate the next transaction id
    pub fn next_txn_id(&self) -> TxnId {
        TxnId::new(self.next_txn_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Advance the timestamp counter past an externally chosen timestamp
    ///
    /// Keeps later `next_timestamp` calls above `ts`. Never moves the counter
    /// backwards, and ignores the sentinels. Observing `u64::MAX - 1`
    /// exhausts the oracle.
    pub fn observe(&self, ts: Timestamp) {
        if ts.is_real() {
            // ts < u64::MAX, so ts + 1 cannot overflow
            self.next_ts.fetch_max(ts.as_u64() + 1, Ordering::SeqCst);
        }
    }

    /// Most recently issued timestamp, `NONE` if none was issued yet
    pub fn current_timestamp(&self) -> Timestamp {
        Timestamp::new(self.next_ts.load(Ordering::SeqCst) - 1)
    }
}

impl Default for TimestampOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_oracle() {
        let oracle = TimestampOracle::new();
        assert_eq!(oracle.current_timestamp(), Timestamp::NONE);
        assert_eq!(oracle.next_timestamp().unwrap(), Timestamp::new(1));
        assert_eq!(oracle.current_timestamp(), Timestamp::new(1));
    }

    #[test]
    fn test_next_txn_id() {
        let oracle = TimestampOracle::default();
        assert_eq!(oracle.next_txn_id(), TxnId::new(1));
        assert_eq!(oracle.next_txn_id(), TxnId::new(2));
        assert_eq!(oracle.next_txn_id(), TxnId::new(3));
    }

    #[test]
    fn test_with_start() {
        let oracle = TimestampOracle::with_start(100, 7);
        assert_eq!(oracle.next_timestamp().unwrap(), Timestamp::new(100));
        assert_eq!(oracle.next_timestamp().unwrap(), Timestamp::new(101));
        assert_eq!(oracle.next_txn_id(), TxnId::new(7));
    }

    #[test]
    fn test_zero_start_never_issues_sentinel() {
        let oracle = TimestampOracle::with_start(0, 0);
        assert!(oracle.next_timestamp().unwrap().is_real());
        assert!(!oracle.next_txn_id().is_none());
    }

    #[test]
    fn test_observe_moves_forward_only() {
        let oracle = TimestampOracle::new();
        oracle.observe(Timestamp::new(20));
        assert_eq!(oracle.current_timestamp(), Timestamp::new(20));
        oracle.observe(Timestamp::new(5));
        oracle.observe(Timestamp::LATEST);
        assert_eq!(oracle.next_timestamp().unwrap(), Timestamp::new(21));
    }

    #[test]
    fn test_observe_near_latest_exhausts_instead_of_wrapping() {
        let oracle = TimestampOracle::new();
        oracle.observe(Timestamp::new(u64::MAX - 2));
        assert_eq!(oracle.next_timestamp().unwrap(), Timestamp::new(u64::MAX - 1));

        assert_eq!(oracle.next_timestamp(), Err(Error::TimestampsExhausted));
        assert_eq!(oracle.next_timestamp(), Err(Error::TimestampsExhausted));
        assert_eq!(oracle.current_timestamp(), Timestamp::new(u64::MAX - 1));
    }

    #[test]
    fn test_observe_last_real_timestamp() {
        let oracle = TimestampOracle::new();
        oracle.observe(Timestamp::new(u64::MAX - 1));
        assert_eq!(oracle.next_timestamp(), Err(Error::TimestampsExhausted));
        assert!(oracle.current_timestamp().is_real());
    }

    #[test]
    fn test_start_at_last_real_timestamp() {
        let oracle = TimestampOracle::with_start(u64::MAX - 1, 1);
        assert_eq!(oracle.next_timestamp().unwrap(), Timestamp::new(u64::MAX - 1));
        assert!(oracle.next_timestamp().is_err());
    }

    #[test]
    fn test_timestamps_unique_across_threads() {
        let oracle = Arc::new(TimestampOracle::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let oracle = Arc::clone(&oracle);
                thread::spawn(move || {
                    (0..1000)
                        .map(|_| oracle.next_timestamp().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let issued = handle.join().unwrap();
            assert!(issued.windows(2).all(|w| w[0] < w[1]));
            for ts in issued {
                assert!(seen.insert(ts), "duplicate timestamp {}", ts);
            }
        }
        assert_eq!(seen.len(), 8000);
    }
}
