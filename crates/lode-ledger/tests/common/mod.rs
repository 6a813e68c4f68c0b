//! Shared fixtures: deterministic chain building and an event recorder.
#![allow(dead_code)]

use lode_core::{
    Block, BlockHeader, CompleteBlock, Hash256, KeyImage, KeyInput, OutputTarget, PublicKey,
    Transaction, TransactionInput, TransactionOutput,
};
use lode_ledger::{ContainerHandle, LedgerObserver};
use std::sync::Mutex;

pub fn h(seed: &str) -> Hash256 {
    Hash256(*blake3::hash(seed.as_bytes()).as_bytes())
}

pub fn pk(seed: &str) -> PublicKey {
    PublicKey(*blake3::hash(seed.as_bytes()).as_bytes())
}

pub fn image(seed: &str) -> KeyImage {
    KeyImage(*blake3::hash(seed.as_bytes()).as_bytes())
}

/// Content-derived transaction hash so rebuilding the same chain yields the
/// same hashes.
pub fn tx_hash(tx: &Transaction) -> Hash256 {
    let bytes = bincode::serialize(tx).expect("transaction serializes");
    Hash256(*blake3::hash(&bytes).as_bytes())
}

pub fn coinbase(height: u32, amounts: &[u64]) -> Transaction {
    Transaction {
        version: 1,
        unlock_time: 0,
        inputs: vec![TransactionInput::Base {
            block_height: height,
        }],
        outputs: amounts
            .iter()
            .map(|&amount| TransactionOutput {
                amount,
                target: OutputTarget::Key(pk(&format!("cb-{height}-{amount}"))),
            })
            .collect(),
        extra: vec![],
    }
}

/// A transaction spending `(amount, indexes)` with a seeded key image and
/// producing single-key outputs of `out_amounts`.
pub fn key_spend(seed: &str, amount: u64, indexes: Vec<u32>, out_amounts: &[u64]) -> Transaction {
    Transaction {
        version: 1,
        unlock_time: 0,
        inputs: vec![TransactionInput::Key(KeyInput {
            amount,
            output_indexes: indexes,
            key_image: image(seed),
        })],
        outputs: out_amounts
            .iter()
            .map(|&out| TransactionOutput {
                amount: out,
                target: OutputTarget::Key(pk(&format!("out-{seed}-{out}"))),
            })
            .collect(),
        extra: vec![],
    }
}

/// Assemble a candidate block on top of `prev_tip` (`None` for genesis).
pub fn make_block(
    prev_tip: Option<(u32, Hash256)>,
    timestamp: u64,
    coinbase_amounts: &[u64],
    txs: Vec<Transaction>,
) -> CompleteBlock {
    let height = prev_tip.map_or(0, |(tip, _)| tip + 1);
    let previous_hash = prev_tip.map_or(Hash256::ZERO, |(_, hash)| hash);
    let cb = coinbase(height, coinbase_amounts);
    let transactions: Vec<(Hash256, Transaction)> =
        txs.into_iter().map(|tx| (tx_hash(&tx), tx)).collect();
    let block = Block {
        header: BlockHeader {
            major_version: 1,
            minor_version: 0,
            nonce: 0,
            timestamp,
            previous_hash,
        },
        coinbase: cb.clone(),
        transaction_hashes: transactions.iter().map(|(hash, _)| *hash).collect(),
    };
    CompleteBlock {
        hash: h(&format!("block-{height}-{previous_hash}-{timestamp}")),
        coinbase_hash: tx_hash(&cb),
        block,
        transactions,
    }
}

/// Every event the store emitted, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Added(Vec<Hash256>),
    DeleteBegin(Hash256),
    DeleteEnd(Hash256),
    Detach(u32),
    Updated(Hash256, usize),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut self.events.lock().unwrap())
    }
}

impl LedgerObserver for RecordingObserver {
    fn blocks_added(&self, hashes: &[Hash256]) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Added(hashes.to_vec()));
    }

    fn transaction_delete_begin(&self, hash: Hash256) {
        self.events.lock().unwrap().push(Event::DeleteBegin(hash));
    }

    fn transaction_delete_end(&self, hash: Hash256) {
        self.events.lock().unwrap().push(Event::DeleteEnd(hash));
    }

    fn blockchain_detach(&self, new_height: u32) {
        self.events.lock().unwrap().push(Event::Detach(new_height));
    }

    fn transaction_updated(&self, hash: Hash256, containers: &[ContainerHandle]) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Updated(hash, containers.len()));
    }
}
