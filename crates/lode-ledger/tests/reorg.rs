//! Reorg reversibility: detach must restore every index exactly.

mod common;

use common::*;
use lode_core::{CompleteBlock, Hash256, KeyImage};
use lode_ledger::{AcceptAllValidator, Ledger, OutputRecord};
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

const AMOUNTS: [u64; 3] = [5, 100, 250];

/// Observable shape of the ledger, built entirely through the query
/// surface.
#[derive(Debug, PartialEq)]
struct Fingerprint {
    height: u32,
    tip: Option<(u32, Hash256)>,
    transactions: usize,
    block_hashes: Vec<Option<Hash256>>,
    buckets: Vec<(u64, u32)>,
    outputs: Vec<Option<OutputRecord>>,
    spent: Vec<bool>,
}

fn fingerprint(ledger: &Ledger, images: &[KeyImage]) -> Fingerprint {
    let buckets: Vec<(u64, u32)> = AMOUNTS
        .iter()
        .map(|&amount| (amount, ledger.output_bucket_len(amount)))
        .collect();
    let outputs = AMOUNTS
        .iter()
        .flat_map(|&amount| {
            (0..ledger.output_bucket_len(amount) + 1).map(move |index| (amount, index))
        })
        .map(|(amount, index)| ledger.output(amount, index))
        .collect();
    Fingerprint {
        height: ledger.height(),
        tip: ledger.tip(),
        transactions: ledger.transaction_count(),
        block_hashes: (0..ledger.height() + 1)
            .map(|height| ledger.block_hash_at(height))
            .collect(),
        buckets,
        outputs,
        spent: images
            .iter()
            .map(|image| ledger.is_spent_key_image(image))
            .collect(),
    }
}

/// Build a valid chain from a compact recipe: per block, how many coinbase
/// outputs to mint and whether to spend the oldest unspent output. Index
/// bookkeeping mirrors acceptance order (coinbase outputs first, then
/// transaction outputs).
fn build_chain(plan: &[(u8, bool)]) -> (Vec<CompleteBlock>, Vec<KeyImage>) {
    let mut blocks = vec![make_block(None, 1_000, &[100, 250], vec![])];
    let mut next_index: HashMap<u64, u32> = HashMap::from([(100, 1), (250, 1)]);
    let mut available: Vec<(u64, u32)> = vec![(100, 0), (250, 0)];
    let mut images = Vec::new();

    for (i, &(minted, spend)) in plan.iter().enumerate() {
        let height = i as u32 + 1;
        let timestamp = 1_000 + u64::from(height);
        let tip = blocks.last().map(|b| b.hash).unwrap_or_default();

        let cb_amounts: Vec<u64> = (0..minted)
            .map(|j| if j % 2 == 0 { 100 } else { 250 })
            .collect();
        let mut txs = Vec::new();
        let mut tx_outputs: Vec<(u64, u32)> = Vec::new();
        if spend {
            if let Some((amount, index)) = available.first().copied() {
                available.remove(0);
                let seed = format!("spend-{height}");
                images.push(image(&seed));
                txs.push(key_spend(&seed, amount, vec![index], &[5]));
                tx_outputs.push((5, 0));
            }
        }

        // acceptance order: coinbase outputs take their bucket indices
        // before any regular transaction's outputs
        for &amount in &cb_amounts {
            let index = next_index.entry(amount).or_insert(0);
            available.push((amount, *index));
            *index += 1;
        }
        for (amount, _) in tx_outputs {
            let index = next_index.entry(amount).or_insert(0);
            available.push((amount, *index));
            *index += 1;
        }

        blocks.push(make_block(
            Some((height - 1, tip)),
            timestamp,
            &cb_amounts,
            txs,
        ));
    }
    (blocks, images)
}

fn apply_all(ledger: &Ledger, blocks: &[CompleteBlock]) {
    for block in blocks {
        ledger.add_block(block).unwrap();
    }
}

proptest! {
    #[test]
    fn detach_then_replay_is_identity(plan in proptest::collection::vec((1u8..=3, any::<bool>()), 1..5)) {
        let (blocks, images) = build_chain(&plan);

        let ledger = Ledger::new(Arc::new(AcceptAllValidator));
        apply_all(&ledger, &blocks);
        let applied = fingerprint(&ledger, &images);

        ledger.detach_to_height(0).unwrap();

        // after full detach the ledger matches one that only ever saw genesis
        let fresh = Ledger::new(Arc::new(AcceptAllValidator));
        fresh.add_block(&blocks[0]).unwrap();
        prop_assert_eq!(fingerprint(&ledger, &images), fingerprint(&fresh, &images));

        // replaying the same blocks reproduces the original state exactly
        apply_all(&ledger, &blocks[1..]);
        prop_assert_eq!(fingerprint(&ledger, &images), applied);
    }
}

#[test]
fn switching_to_an_alternate_branch() {
    let ledger = Ledger::new(Arc::new(AcceptAllValidator));
    let genesis = make_block(None, 1_000, &[100, 100], vec![]);
    let a1 = make_block(
        Some((0, genesis.hash)),
        1_001,
        &[100],
        vec![key_spend("branch-a", 100, vec![0], &[60])],
    );
    let a2 = make_block(Some((1, a1.hash)), 1_002, &[100], vec![]);
    ledger.add_block(&genesis).unwrap();
    ledger.add_block(&a1).unwrap();
    ledger.add_block(&a2).unwrap();

    // fork point at genesis; replay a different branch
    ledger.detach_to_height(0).unwrap();
    let b1 = make_block(
        Some((0, genesis.hash)),
        2_001,
        &[250],
        vec![key_spend("branch-b", 100, vec![1], &[40])],
    );
    ledger.add_block(&b1).unwrap();

    assert_eq!(ledger.tip(), Some((1, b1.hash)));
    assert!(!ledger.is_spent_key_image(&image("branch-a")));
    assert!(ledger.is_spent_key_image(&image("branch-b")));
    assert_eq!(ledger.output_bucket_len(60), 0);
    assert_eq!(ledger.output_bucket_len(40), 1);
}
