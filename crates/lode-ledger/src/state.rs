//! Internal chain state: block index, transaction map, and spend indices.
//!
//! `ChainState` is a plain data structure with no locking and no event
//! emission; the public [`Ledger`](crate::store::Ledger) wraps it. All
//! validation happens in `check_block` before `apply_block` touches
//! anything, which is what makes block acceptance all-or-nothing.

use crate::error::{LedgerError, Result};
use crate::multisig_index::{MultisigOutputIndex, MultisigOutputRecord};
use crate::output_index::{OutputIndex, OutputRecord};
use crate::spent_images::SpentImageSet;
use crate::timestamp_index::TimestampIndex;
use crate::validator::TransactionValidator;
use lode_core::{
    BlockHeader, CompleteBlock, Hash256, KeyImage, OutputTarget, Transaction, TransactionInput,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A block as retained by the block index. Transaction bodies live in the
/// transaction map; the block keeps only hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlock {
    /// Block hash.
    pub hash: Hash256,
    /// Header fields.
    pub header: BlockHeader,
    /// Hash of the embedded coinbase transaction.
    pub coinbase_hash: Hash256,
    /// Regular transaction hashes in acceptance order.
    pub transaction_hashes: Vec<Hash256>,
}

/// A held transaction plus the index assignments recorded when it was
/// accepted. The assignments are what make detach exact: each one names
/// the `(amount, index)` slot the transaction occupies, so removal can
/// truncate buckets back to the precise pre-insertion counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    /// Height of the containing block.
    pub block_height: u32,
    /// The transaction body.
    pub transaction: Transaction,
    /// `(amount, local index)` assigned to each single-key output, in
    /// output order.
    pub(crate) key_outputs: Vec<(u64, u32)>,
    /// `(amount, global index)` assigned to each multisig output, in
    /// output order.
    pub(crate) multisig_outputs: Vec<(u64, u32)>,
    /// Multisig outputs this transaction's inputs marked spent.
    pub(crate) multisig_spends: Vec<(u64, u32)>,
}

/// The five index structures covered by the persisted snapshot, in their
/// archive order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ChainIndices {
    pub(crate) blocks: Vec<StoredBlock>,
    pub(crate) transactions: HashMap<Hash256, TransactionEntry>,
    pub(crate) spent_images: SpentImageSet,
    pub(crate) outputs: OutputIndex,
    pub(crate) multisig_outputs: MultisigOutputIndex,
}

/// Full in-memory state: persisted indices plus the derived timestamp
/// index, which is rebuilt rather than persisted.
#[derive(Debug, Default)]
pub(crate) struct ChainState {
    pub(crate) indices: ChainIndices,
    pub(crate) timestamps: TimestampIndex,
}

impl ChainState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of blocks held; the next block's height.
    pub(crate) fn height(&self) -> u32 {
        self.indices.blocks.len() as u32
    }

    /// Current tip `(height, hash)`, if any block is held.
    pub(crate) fn tip(&self) -> Option<(u32, Hash256)> {
        let block = self.indices.blocks.last()?;
        Some((self.height() - 1, block.hash))
    }

    /// Validate a candidate against the current state without mutating
    /// anything. `apply_block` must only run after this returns `Ok`.
    pub(crate) fn check_block(
        &self,
        candidate: &CompleteBlock,
        validator: &dyn TransactionValidator,
    ) -> Result<()> {
        let expected_height = self.height();
        let expected_previous = self.tip().map_or(Hash256::ZERO, |(_, hash)| hash);
        if candidate.block.header.previous_hash != expected_previous
            || coinbase_height(&candidate.block.coinbase) != Some(expected_height)
        {
            return Err(LedgerError::InvalidHeightLinkage {
                expected_height,
                expected_previous,
            });
        }

        // Outputs created earlier in this same block are legal references,
        // so track staged counts alongside the committed indices.
        let mut staged_outputs: HashMap<u64, u32> = HashMap::new();
        let mut staged_multisig: HashMap<u64, u32> = HashMap::new();
        let mut staged_images: HashSet<KeyImage> = HashSet::new();
        let mut staged_spends: HashSet<(u64, u32)> = HashSet::new();
        let mut staged_hashes: HashSet<Hash256> = HashSet::new();

        let regular = candidate.transactions.iter().map(|(hash, tx)| (*hash, tx));
        for (hash, tx) in std::iter::once((candidate.coinbase_hash, &candidate.block.coinbase))
            .chain(regular)
        {
            // Transaction hashes are unique while held. A re-inserted hash
            // would overwrite the first entry's recorded index assignments
            // and break exact reversal on detach.
            if self.indices.transactions.contains_key(&hash) || !staged_hashes.insert(hash) {
                return Err(LedgerError::DuplicateTransaction(hash));
            }

            if !tx.is_coinbase()
                && (!validator.check_transaction_inputs(tx)
                    || !validator.check_transaction_size(tx.binary_size()))
            {
                return Err(LedgerError::ValidationFailed(hash));
            }

            for input in &tx.inputs {
                match input {
                    TransactionInput::Base { .. } => {}
                    TransactionInput::Key(key_input) => {
                        if self.indices.spent_images.contains(&key_input.key_image)
                            || !staged_images.insert(key_input.key_image)
                        {
                            return Err(LedgerError::DoubleSpend(key_input.key_image));
                        }
                        let available = self.indices.outputs.bucket_len(key_input.amount)
                            + staged_outputs.get(&key_input.amount).copied().unwrap_or(0);
                        for &index in &key_input.output_indexes {
                            if index >= available {
                                return Err(LedgerError::InvalidReference {
                                    amount: key_input.amount,
                                    index,
                                });
                            }
                        }
                    }
                    TransactionInput::Multisignature(ms_input) => {
                        let available = self.indices.multisig_outputs.bucket_len(ms_input.amount)
                            + staged_multisig.get(&ms_input.amount).copied().unwrap_or(0);
                        if ms_input.output_index >= available {
                            return Err(LedgerError::InvalidReference {
                                amount: ms_input.amount,
                                index: ms_input.output_index,
                            });
                        }
                        let already_spent = self
                            .indices
                            .multisig_outputs
                            .get(ms_input.amount, ms_input.output_index)
                            .is_some_and(|record| record.spent);
                        if already_spent
                            || !staged_spends.insert((ms_input.amount, ms_input.output_index))
                        {
                            return Err(LedgerError::MultisigDoubleSpend {
                                amount: ms_input.amount,
                                index: ms_input.output_index,
                            });
                        }
                    }
                }
            }

            for output in &tx.outputs {
                let staged = match output.target {
                    OutputTarget::Key(_) => staged_outputs.entry(output.amount).or_insert(0),
                    OutputTarget::Multisignature { .. } => {
                        staged_multisig.entry(output.amount).or_insert(0)
                    }
                };
                *staged += 1;
            }
        }

        Ok(())
    }

    /// Commit a candidate that passed `check_block`. Returns the height of
    /// the new block.
    pub(crate) fn apply_block(&mut self, candidate: &CompleteBlock) -> u32 {
        let height = self.height();
        self.insert_transaction(height, candidate.coinbase_hash, &candidate.block.coinbase);
        for (hash, tx) in &candidate.transactions {
            self.insert_transaction(height, *hash, tx);
        }
        self.indices.blocks.push(StoredBlock {
            hash: candidate.hash,
            header: candidate.block.header.clone(),
            coinbase_hash: candidate.coinbase_hash,
            transaction_hashes: candidate.block.transaction_hashes.clone(),
        });
        self.timestamps
            .add(candidate.block.header.timestamp, candidate.hash);
        height
    }

    fn insert_transaction(&mut self, height: u32, hash: Hash256, tx: &Transaction) {
        let mut multisig_spends = Vec::new();
        for input in &tx.inputs {
            match input {
                TransactionInput::Base { .. } => {}
                TransactionInput::Key(key_input) => {
                    self.indices.spent_images.insert(key_input.key_image);
                }
                TransactionInput::Multisignature(ms_input) => {
                    self.indices
                        .multisig_outputs
                        .set_spent(ms_input.amount, ms_input.output_index, true);
                    multisig_spends.push((ms_input.amount, ms_input.output_index));
                }
            }
        }

        let mut key_outputs = Vec::new();
        let mut multisig_outputs = Vec::new();
        for output in &tx.outputs {
            match &output.target {
                OutputTarget::Key(key) => {
                    let index = self.indices.outputs.push(
                        output.amount,
                        OutputRecord {
                            key: *key,
                            tx_hash: hash,
                        },
                    );
                    key_outputs.push((output.amount, index));
                }
                OutputTarget::Multisignature {
                    keys,
                    required_signatures,
                } => {
                    let index = self.indices.multisig_outputs.push(
                        output.amount,
                        MultisigOutputRecord {
                            keys: keys.clone(),
                            required_signatures: *required_signatures,
                            tx_hash: hash,
                            spent: false,
                        },
                    );
                    multisig_outputs.push((output.amount, index));
                }
            }
        }

        self.indices.transactions.insert(
            hash,
            TransactionEntry {
                block_height: height,
                transaction: tx.clone(),
                key_outputs,
                multisig_outputs,
                multisig_spends,
            },
        );
    }

    /// Hashes of the tip block's transactions in removal order: reverse of
    /// acceptance order, coinbase last (it was logically first).
    pub(crate) fn tip_removal_order(&self) -> Option<Vec<Hash256>> {
        let block = self.indices.blocks.last()?;
        let mut order: Vec<Hash256> = block.transaction_hashes.iter().rev().copied().collect();
        order.push(block.coinbase_hash);
        Some(order)
    }

    /// Remove one transaction, truncating every index back to its exact
    /// pre-insertion shape. Safe only in the order `tip_removal_order`
    /// yields; each removed output must currently be the newest of its
    /// bucket.
    pub(crate) fn remove_transaction(&mut self, hash: &Hash256) -> Option<TransactionEntry> {
        let entry = self.indices.transactions.remove(hash)?;
        for &(amount, index) in entry.key_outputs.iter().rev() {
            debug_assert_eq!(self.indices.outputs.bucket_len(amount), index + 1);
            self.indices.outputs.pop(amount);
        }
        for &(amount, index) in entry.multisig_outputs.iter().rev() {
            debug_assert_eq!(self.indices.multisig_outputs.bucket_len(amount), index + 1);
            self.indices.multisig_outputs.pop(amount);
        }
        for image in entry.transaction.key_images() {
            self.indices.spent_images.remove(&image);
        }
        for &(amount, index) in &entry.multisig_spends {
            self.indices.multisig_outputs.set_spent(amount, index, false);
        }
        Some(entry)
    }

    /// Drop the tip block from the block and timestamp indices. Call only
    /// after its transactions have been removed.
    pub(crate) fn pop_block(&mut self) -> Option<StoredBlock> {
        let block = self.indices.blocks.pop()?;
        self.timestamps.remove(block.header.timestamp, &block.hash);
        Some(block)
    }

    /// Recompute the timestamp index from the block index, used after a
    /// snapshot install.
    pub(crate) fn rebuild_timestamps(&mut self) {
        self.timestamps.clear();
        for block in &self.indices.blocks {
            self.timestamps.add(block.header.timestamp, block.hash);
        }
    }

    /// True if any of the transaction's key images is already spent.
    pub(crate) fn have_spent_key_images(&self, tx: &Transaction) -> bool {
        tx.key_images()
            .any(|image| self.indices.spent_images.contains(&image))
    }
}

fn coinbase_height(coinbase: &Transaction) -> Option<u32> {
    match coinbase.inputs.as_slice() {
        [TransactionInput::Base { block_height }] => Some(*block_height),
        _ => None,
    }
}
