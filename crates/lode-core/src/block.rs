//! Block structure and the decoded candidate unit.

use crate::hash::Hash256;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Block header. Proof-of-work fields are carried but never validated here;
/// difficulty checks belong to the consensus layer feeding the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Major format version.
    pub major_version: u8,
    /// Minor format version.
    pub minor_version: u8,
    /// Proof-of-work nonce.
    pub nonce: u32,
    /// Unix timestamp claimed by the miner.
    pub timestamp: u64,
    /// Hash of the predecessor block; [`Hash256::ZERO`] for genesis.
    pub previous_hash: Hash256,
}

/// A block as the ledger stores it: header, embedded coinbase, and the
/// hashes of its regular transactions in acceptance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Header fields.
    pub header: BlockHeader,
    /// The reward-granting transaction, logically first in the block.
    pub coinbase: Transaction,
    /// Hashes of the non-coinbase transactions, in acceptance order.
    pub transaction_hashes: Vec<Hash256>,
}

/// A fully decoded candidate block handed to the store by the driver.
///
/// The decoder (out of scope here) supplies every hash; `transactions`
/// carries the bodies for `block.transaction_hashes` in the same order.
/// The coinbase travels inside `block` and is not repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteBlock {
    /// Hash of the block.
    pub hash: Hash256,
    /// Hash of the embedded coinbase transaction.
    pub coinbase_hash: Hash256,
    /// The decoded block.
    pub block: Block,
    /// `(hash, body)` for each regular transaction, matching
    /// `block.transaction_hashes` positionally.
    pub transactions: Vec<(Hash256, Transaction)>,
}
