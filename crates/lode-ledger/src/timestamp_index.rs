//! Timestamp → block hash index.
//!
//! Answers bounded "which blocks fall in this time window" queries. Not
//! part of the persisted snapshot; it is rebuilt from the block index when
//! a snapshot is installed.

use lode_core::Hash256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Multimap from block timestamp to the hashes carrying it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampIndex {
    index: BTreeMap<u64, Vec<Hash256>>,
}

impl TimestampIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `hash` under `timestamp`.
    pub fn add(&mut self, timestamp: u64, hash: Hash256) {
        self.index.entry(timestamp).or_default().push(hash);
    }

    /// Forget `hash` under `timestamp`; returns `false` if it was not there.
    pub fn remove(&mut self, timestamp: u64, hash: &Hash256) -> bool {
        let Some(hashes) = self.index.get_mut(&timestamp) else {
            return false;
        };
        let Some(pos) = hashes.iter().position(|h| h == hash) else {
            return false;
        };
        hashes.remove(pos);
        if hashes.is_empty() {
            self.index.remove(&timestamp);
        }
        true
    }

    /// Collect up to `limit` hashes whose timestamp lies in `range`, oldest
    /// first, along with the total number of hashes in the range.
    pub fn find(&self, range: RangeInclusive<u64>, limit: u32) -> (Vec<Hash256>, u32) {
        let mut hashes = Vec::new();
        let mut total = 0u32;
        for bucket in self.index.range(range).map(|(_, hashes)| hashes) {
            for hash in bucket {
                total += 1;
                if hashes.len() < limit as usize {
                    hashes.push(*hash);
                }
            }
        }
        (hashes, total)
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.index.clear();
    }
}
