//! Key to version chain container
//!
//! `ItemStore` maps each key to its `VersionChain`. It is the only place
//! chains are created; neither transactions nor chains create or destroy
//! chains themselves.
//!
//! # Design
//!
//! - DashMap: sharded map, lookups of different keys rarely contend
//! - FxHash: fast non-crypto hash for short keys
//! - `Arc<VersionChain>`: callers keep using a chain after the map guard is
//!   released, and a transaction can hold on to every chain it touched
//!
//! The map guard is never held while a chain lock is taken.

use std::hash::BuildHasherDefault;
use std::sync::Arc;

use dashmap::DashMap;
use kvmodel_core::Key;
use rustc_hash::FxHasher;

use crate::chain::VersionChain;

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Concurrent map from key to version chain
pub struct ItemStore {
    chains: DashMap<Key, Arc<VersionChain>, FxBuildHasher>,
}

impl ItemStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            chains: DashMap::with_hasher(FxBuildHasher::default()),
        }
    }

    /// Create with expected number of keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chains: DashMap::with_capacity_and_hasher(capacity, FxBuildHasher::default()),
        }
    }

    /// Get the chain for `key`, creating an empty one on first use
    pub fn get_or_create_chain(&self, key: &Key) -> Arc<VersionChain> {
        if let Some(chain) = self.chains.get(key) {
            return Arc::clone(chain.value());
        }
        let chain = self
            .chains
            .entry(key.clone())
            .or_insert_with(|| Arc::new(VersionChain::new()));
        Arc::clone(chain.value())
    }

    /// Get the chain for `key` if one was ever created
    pub fn chain(&self, key: &Key) -> Option<Arc<VersionChain>> {
        self.chains.get(key).map(|chain| Arc::clone(chain.value()))
    }

    /// Check if a chain exists for `key`
    ///
    /// A chain can exist and still be empty, e.g. after a rollback.
    pub fn contains_key(&self, key: &Key) -> bool {
        self.chains.contains_key(key)
    }

    /// Number of chains
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Check if no chain was ever created
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// All keys with a chain, sorted
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.chains.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}
