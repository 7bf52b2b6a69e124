//! Property tests for VersionChain visibility
//!
//! These tests compare the chain against a simple model:
//! - Latest committed record wins regardless of the order timestamps were fixed
//! - Reads at a timestamp return the last-appended record committed at or before it
//! - Rolling back a transaction leaves the chain as if it never ran

use std::sync::Arc;

use kvmodel_core::{Timestamp, TxnId, Value};
use kvmodel_storage::{VersionChain, VersionRecord};
use proptest::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn payload(i: usize) -> Vec<u8> {
    format!("v{}", i).into_bytes()
}

fn append(chain: &VersionChain, i: usize, txn: u64) {
    let record = Arc::new(VersionRecord::new(Value::Bytes(payload(i)), TxnId::new(txn)));
    chain.append(record, false, false).unwrap();
}

/// Number of records plus a permutation giving the order timestamps are fixed in
fn fix_orders() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (1usize..10).prop_flat_map(|n| (Just(n), Just((0..n).collect::<Vec<_>>()).prop_shuffle()))
}

/// Per-record commit timestamps, possibly tied and out of order
fn timestamps() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..50, 1..10)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn latest_committed_wins_regardless_of_fix_order((n, order) in fix_orders()) {
        let chain = VersionChain::new();
        for i in 0..n {
            append(&chain, i, i as u64 + 1);
        }
        for (k, i) in order.iter().enumerate() {
            chain
                .fix_commit_timestamp(TxnId::new(*i as u64 + 1), Timestamp::new(k as u64 + 1))
                .unwrap();
        }
        prop_assert_eq!(chain.visible_value(Timestamp::LATEST), Some(payload(n - 1)));
    }

    #[test]
    fn read_at_timestamp_matches_model(ts in timestamps(), read_at in 0u64..60) {
        let chain = VersionChain::new();
        for (i, t) in ts.iter().enumerate() {
            append(&chain, i, i as u64 + 1);
            chain
                .fix_commit_timestamp(TxnId::new(i as u64 + 1), Timestamp::new(*t))
                .unwrap();
        }

        let expected = ts
            .iter()
            .enumerate()
            .filter(|(_, t)| **t <= read_at)
            .map(|(i, _)| payload(i))
            .last();
        prop_assert_eq!(chain.visible_value(Timestamp::new(read_at)), expected);

        for (i, _) in ts.iter().enumerate().filter(|(_, t)| **t <= read_at) {
            prop_assert!(chain.contains_any(&Value::Bytes(payload(i)), Timestamp::new(read_at)));
        }
    }

    #[test]
    fn rollback_is_complete_undo(
        owners in prop::collection::vec(1u64..4, 1..12),
        victim in 1u64..4,
        read_at in 1u64..20,
    ) {
        // Same workload twice: once with the victim's records, once without
        let with_victim = VersionChain::new();
        let without_victim = VersionChain::new();
        for (i, owner) in owners.iter().enumerate() {
            append(&with_victim, i, *owner);
            if *owner != victim {
                append(&without_victim, i, *owner);
            }
        }
        with_victim.rollback_updates(TxnId::new(victim));

        for chain in [&with_victim, &without_victim] {
            for owner in 1u64..4 {
                if owner == victim {
                    continue;
                }
                let count = owners.iter().filter(|o| **o == owner).count();
                for _ in 0..count {
                    chain
                        .fix_commit_timestamp(TxnId::new(owner), Timestamp::new(owner * 5))
                        .unwrap();
                }
            }
        }

        prop_assert_eq!(with_victim.version_count(), without_victim.version_count());
        prop_assert!(with_victim.history().iter().all(|r| !r.is_owned_by(TxnId::new(victim))));
        prop_assert_eq!(
            with_victim.visible_value(Timestamp::new(read_at)),
            without_victim.visible_value(Timestamp::new(read_at))
        );
        prop_assert_eq!(
            with_victim.visible_value(Timestamp::LATEST),
            without_victim.visible_value(Timestamp::LATEST)
        );
    }
}
