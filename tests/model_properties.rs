//! Property tests against a sequential reference model
//!
//! Random single-operation transactions are run one after another through a
//! `Database`. A `BTreeMap` tracks the expected committed state after every
//! step, and every snapshot taken along the way must stay readable.

mod common;

use std::collections::BTreeMap;

use common::{db_with_table, key};
use kvmodel::{Error, Timestamp};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert { key: u8, value: u8, overwrite: bool },
    Update { key: u8, value: u8 },
    Remove { key: u8 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4, any::<u8>(), any::<bool>())
            .prop_map(|(key, value, overwrite)| Op::Insert { key, value, overwrite }),
        (0u8..4, any::<u8>()).prop_map(|(key, value)| Op::Update { key, value }),
        (0u8..4).prop_map(|key| Op::Remove { key }),
    ]
}

fn name(k: u8) -> String {
    format!("k{}", k)
}

type Model = BTreeMap<u8, Vec<u8>>;

/// Expected outcome of `op` against the committed `model`
fn expected(model: &Model, op: &Op) -> Result<(), Error> {
    match op {
        Op::Insert { key, overwrite, .. } if !overwrite && model.contains_key(key) => {
            Err(Error::DuplicateKey)
        }
        Op::Update { key, .. } | Op::Remove { key } if !model.contains_key(key) => {
            Err(Error::NotFound)
        }
        _ => Ok(()),
    }
}

fn apply(model: &mut Model, op: &Op) {
    match op {
        Op::Insert { key, value, .. } | Op::Update { key, value } => {
            model.insert(*key, vec![*value]);
        }
        Op::Remove { key } => {
            model.remove(key);
        }
    }
}

proptest! {
    #[test]
    fn sequential_transactions_match_model(
        steps in prop::collection::vec((op(), any::<bool>()), 1..40)
    ) {
        let (db, table) = db_with_table();
        let mut model = Model::new();
        let mut snapshots: Vec<(Timestamp, Model)> = Vec::new();

        for (op, commit) in &steps {
            let mut txn = db.begin_transaction();
            let result = match op {
                Op::Insert { key: k, value, overwrite } => {
                    table.insert(&mut txn, &key(&name(*k)), vec![*value], *overwrite)
                }
                Op::Update { key: k, value } => table.update(&mut txn, &key(&name(*k)), vec![*value]),
                Op::Remove { key: k } => table.remove(&mut txn, &key(&name(*k))),
            };
            prop_assert_eq!(&result, &expected(&model, op));

            if result.is_ok() && *commit {
                let ts = db.commit_transaction(&mut txn).unwrap();
                apply(&mut model, op);
                snapshots.push((ts, model.clone()));
            } else {
                db.rollback_transaction(&mut txn).unwrap();
            }

            for k in 0u8..4 {
                prop_assert_eq!(
                    table.get(&key(&name(k)), Timestamp::LATEST),
                    model.get(&k).cloned()
                );
            }
        }

        for (ts, state) in &snapshots {
            for k in 0u8..4 {
                prop_assert_eq!(table.get(&key(&name(k)), *ts), state.get(&k).cloned());
            }
        }

        // Every chain holds exactly the committed records
        let total: usize = (0u8..4)
            .map(|k| table.chain(&key(&name(k))).version_count())
            .sum();
        prop_assert_eq!(total, snapshots.len());
    }
}
