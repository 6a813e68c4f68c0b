//! Per-amount buckets of single-key outputs.
//!
//! Each denomination owns an independent sequence of outputs; an output is
//! addressed by `(amount, local index)` and indices within a bucket are
//! assigned strictly in acceptance order. Reorg support leans on one
//! property: a push followed by a pop restores the structure bit-for-bit,
//! including removal of a bucket that becomes empty.

use lode_core::{Hash256, PublicKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Descriptor of one single-key output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Key that can claim the output.
    pub key: PublicKey,
    /// Transaction that created the output.
    pub tx_hash: Hash256,
}

/// Amount-bucketed output index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputIndex {
    buckets: HashMap<u64, Vec<OutputRecord>>,
}

impl OutputIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the `amount` bucket and return its local index.
    pub fn push(&mut self, amount: u64, record: OutputRecord) -> u32 {
        let bucket = self.buckets.entry(amount).or_default();
        bucket.push(record);
        (bucket.len() - 1) as u32
    }

    /// Remove the newest record of the `amount` bucket. Empty buckets are
    /// dropped so the map compares equal to its pre-insert state.
    pub fn pop(&mut self, amount: u64) -> Option<OutputRecord> {
        let bucket = self.buckets.get_mut(&amount)?;
        let record = bucket.pop();
        if bucket.is_empty() {
            self.buckets.remove(&amount);
        }
        record
    }

    /// Look up a record by `(amount, local index)`.
    pub fn get(&self, amount: u64, index: u32) -> Option<&OutputRecord> {
        self.buckets.get(&amount)?.get(index as usize)
    }

    /// Number of records in the `amount` bucket.
    pub fn bucket_len(&self, amount: u64) -> u32 {
        self.buckets.get(&amount).map_or(0, |b| b.len() as u32)
    }

    /// Total records across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// True when no bucket holds a record.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
