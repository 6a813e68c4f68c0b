//! Multisignature output index.
//!
//! Same bucket-and-sequence discipline as the single-key [`OutputIndex`],
//! in a separate index space, with one addition: a multisig output is spent
//! by global index rather than by key image, so each record carries a spent
//! flag that detach must be able to clear again.
//!
//! [`OutputIndex`]: crate::output_index::OutputIndex

use lode_core::{Hash256, PublicKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Descriptor of one multisignature output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigOutputRecord {
    /// Participant public keys.
    pub keys: Vec<PublicKey>,
    /// Signatures required to spend.
    pub required_signatures: u8,
    /// Transaction that created the output.
    pub tx_hash: Hash256,
    /// Whether a later transaction has consumed this output.
    pub spent: bool,
}

/// Amount-bucketed multisignature output index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigOutputIndex {
    buckets: HashMap<u64, Vec<MultisigOutputRecord>>,
}

impl MultisigOutputIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the `amount` bucket and return its global index.
    pub fn push(&mut self, amount: u64, record: MultisigOutputRecord) -> u32 {
        let bucket = self.buckets.entry(amount).or_default();
        bucket.push(record);
        (bucket.len() - 1) as u32
    }

    /// Remove the newest record of the `amount` bucket, dropping the bucket
    /// when it empties.
    pub fn pop(&mut self, amount: u64) -> Option<MultisigOutputRecord> {
        let bucket = self.buckets.get_mut(&amount)?;
        let record = bucket.pop();
        if bucket.is_empty() {
            self.buckets.remove(&amount);
        }
        record
    }

    /// Look up a record by `(amount, global index)`.
    pub fn get(&self, amount: u64, index: u32) -> Option<&MultisigOutputRecord> {
        self.buckets.get(&amount)?.get(index as usize)
    }

    /// Flip the spent flag on an existing record. Returns the previous flag,
    /// or `None` when the output does not exist.
    pub fn set_spent(&mut self, amount: u64, index: u32, spent: bool) -> Option<bool> {
        let record = self.buckets.get_mut(&amount)?.get_mut(index as usize)?;
        Some(std::mem::replace(&mut record.spent, spent))
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
