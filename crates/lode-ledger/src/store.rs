//! The public ledger store.
//!
//! Single-writer model: one mutation mutex serializes `add_block` /
//! `detach_to_height` / snapshot installs *and* the event emission that
//! follows each mutation, so observers always see one mutation's events run
//! to completion before the next begins. A separate read-write lock guards
//! the index state itself; it is never held across an observer callback,
//! which lets consumers query the ledger from inside their event handlers
//! without deadlocking.

use crate::error::{LedgerError, Result, SnapshotError};
use crate::events::{ContainerHandle, LedgerObserver};
use crate::multisig_index::MultisigOutputRecord;
use crate::output_index::OutputRecord;
use crate::snapshot::{self, SnapshotData};
use crate::state::{ChainState, TransactionEntry};
use crate::validator::TransactionValidator;
use lode_core::{CompleteBlock, Hash256, Transaction};
use parking_lot::{Mutex, RwLock};
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Canonical chain state store: block index, transaction map, output and
/// spent-image indices, with reorg support and snapshot persistence.
pub struct Ledger {
    validator: Arc<dyn TransactionValidator>,
    observers: RwLock<Vec<Arc<dyn LedgerObserver>>>,
    mutation: Mutex<()>,
    state: RwLock<ChainState>,
}

impl Ledger {
    /// Create an empty ledger that consults `validator` before committing
    /// transactions.
    pub fn new(validator: Arc<dyn TransactionValidator>) -> Self {
        Self {
            validator,
            observers: RwLock::new(Vec::new()),
            mutation: Mutex::new(()),
            state: RwLock::new(ChainState::new()),
        }
    }

    /// Register an observer of ledger mutations. Observers registered
    /// mid-stream start receiving events from the next mutation.
    pub fn add_observer(&self, observer: Arc<dyn LedgerObserver>) {
        self.observers.write().push(observer);
    }

    /// Validate and append one candidate block. On success every index is
    /// updated, the tip advances, and one `blocks_added` event is emitted;
    /// on any rejection no index is touched.
    pub fn add_block(&self, candidate: &CompleteBlock) -> Result<u32> {
        let _mutation = self.mutation.lock();
        let height = {
            let mut state = self.state.write();
            state.check_block(candidate, self.validator.as_ref())?;
            state.apply_block(candidate)
        };
        debug!(height, hash = %candidate.hash, txs = candidate.transactions.len() + 1, "block accepted");
        self.emit(|observer| observer.blocks_added(std::slice::from_ref(&candidate.hash)));
        Ok(height)
    }

    /// Roll the chain back to `target`, removing blocks `target+1..=tip`
    /// from the tip downward. Within a block, transactions are removed in
    /// reverse of acceptance order with the coinbase last; each removal is
    /// bracketed by `transaction_delete_begin` / `transaction_delete_end`
    /// events, and a single `blockchain_detach(target)` follows once every
    /// block is gone. Calling with `target == tip` is a no-op.
    pub fn detach_to_height(&self, target: u32) -> Result<()> {
        let _mutation = self.mutation.lock();
        let tip = match self.state.read().tip() {
            Some((tip, _)) => tip,
            None => return Err(LedgerError::InvalidHeight { target, tip: 0 }),
        };
        if target > tip {
            return Err(LedgerError::InvalidHeight { target, tip });
        }
        if target == tip {
            return Ok(());
        }

        let mut removed_blocks = 0u32;
        let mut removed_txs = 0u32;
        while self.state.read().tip().map(|(height, _)| height) > Some(target) {
            let order = self
                .state
                .read()
                .tip_removal_order()
                .unwrap_or_default();
            for hash in order {
                self.emit(|observer| observer.transaction_delete_begin(hash));
                self.state.write().remove_transaction(&hash);
                self.emit(|observer| observer.transaction_delete_end(hash));
                removed_txs += 1;
            }
            self.state.write().pop_block();
            removed_blocks += 1;
        }

        info!(target, removed_blocks, removed_txs, "chain detached");
        self.emit(|observer| observer.blockchain_detach(target));
        Ok(())
    }

    /// Announce that a held transaction changed confirmation status without
    /// being deleted (e.g. pool → confirmed), naming the downstream
    /// containers affected so consumers can refresh partially.
    pub fn transaction_updated(
        &self,
        hash: Hash256,
        containers: &[ContainerHandle],
    ) -> Result<()> {
        let _mutation = self.mutation.lock();
        if !self.state.read().indices.transactions.contains_key(&hash) {
            return Err(LedgerError::UnknownTransaction(hash));
        }
        self.emit(|observer| observer.transaction_updated(hash, containers));
        Ok(())
    }

    /// True if any of the transaction's key images is already spent. Used
    /// as a cheap pre-acceptance check.
    pub fn have_spent_key_images(&self, tx: &Transaction) -> bool {
        self.state.read().have_spent_key_images(tx)
    }

    /// Membership test for a single key image.
    pub fn is_spent_key_image(&self, image: &lode_core::KeyImage) -> bool {
        self.state.read().indices.spent_images.contains(image)
    }

    /// Current tip `(height, hash)`, or `None` for an empty chain.
    pub fn tip(&self) -> Option<(u32, Hash256)> {
        self.state.read().tip()
    }

    /// Number of blocks held.
    pub fn height(&self) -> u32 {
        self.state.read().height()
    }

    /// Hash of the block at `height`.
    pub fn block_hash_at(&self, height: u32) -> Option<Hash256> {
        self.state
            .read()
            .indices
            .blocks
            .get(height as usize)
            .map(|block| block.hash)
    }

    /// Look up a held transaction and the height it was accepted at.
    pub fn transaction(&self, hash: &Hash256) -> Option<(u32, Transaction)> {
        self.state
            .read()
            .indices
            .transactions
            .get(hash)
            .map(|entry: &TransactionEntry| (entry.block_height, entry.transaction.clone()))
    }

    /// Number of transactions held (coinbases included).
    pub fn transaction_count(&self) -> usize {
        self.state.read().indices.transactions.len()
    }

    /// Look up a single-key output by `(amount, local index)`.
    pub fn output(&self, amount: u64, index: u32) -> Option<OutputRecord> {
        self.state.read().indices.outputs.get(amount, index).cloned()
    }

    /// Number of outputs in the `amount` bucket.
    pub fn output_bucket_len(&self, amount: u64) -> u32 {
        self.state.read().indices.outputs.bucket_len(amount)
    }

    /// Look up a multisignature output by `(amount, global index)`.
    pub fn multisig_output(&self, amount: u64, index: u32) -> Option<MultisigOutputRecord> {
        self.state
            .read()
            .indices
            .multisig_outputs
            .get(amount, index)
            .cloned()
    }

    /// Up to `limit` block hashes with timestamps in `range`, oldest first,
    /// plus the total number of matches.
    pub fn blocks_within_timestamps(
        &self,
        range: RangeInclusive<u64>,
        limit: u32,
    ) -> (Vec<Hash256>, u32) {
        self.state.read().timestamps.find(range, limit)
    }

    /// Persist the current indices to `path`, tagged with the current tip.
    /// Runs under the mutation lock so a checkpoint can never interleave
    /// with a detach.
    pub fn save_snapshot(&self, path: &Path) -> std::result::Result<(), SnapshotError> {
        let _mutation = self.mutation.lock();
        let state = self.state.read();
        let tip_hash = state.tip().map_or(Hash256::ZERO, |(_, hash)| hash);
        snapshot::save(path, tip_hash, &state.indices)
    }

    /// Load a snapshot from `path` and install it, provided it was taken at
    /// exactly `expected_tip`. On any staleness the ledger is left
    /// untouched and the caller rebuilds by replaying blocks.
    pub fn install_snapshot(
        &self,
        path: &Path,
        expected_tip: Hash256,
    ) -> std::result::Result<(), SnapshotError> {
        let data = snapshot::load(path, expected_tip)?;
        self.install(data);
        Ok(())
    }

    fn install(&self, data: SnapshotData) {
        let _mutation = self.mutation.lock();
        let mut state = self.state.write();
        state.indices = data.indices;
        state.rebuild_timestamps();
        info!(height = state.height(), tip = %data.tip_hash, "snapshot installed");
    }

    fn emit(&self, deliver: impl Fn(&dyn LedgerObserver)) {
        let observers = self.observers.read();
        for observer in observers.iter() {
            deliver(observer.as_ref());
        }
    }
}
