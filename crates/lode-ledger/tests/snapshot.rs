//! Snapshot persistence: fidelity, staleness, and all-or-nothing installs.

mod common;

use common::*;
use lode_core::Hash256;
use lode_ledger::{AcceptAllValidator, Ledger, SnapshotError, StaleReason};
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn populated_ledger() -> (Ledger, Vec<lode_core::CompleteBlock>) {
    let ledger = Ledger::new(Arc::new(AcceptAllValidator));
    let genesis = make_block(None, 1_000, &[100, 100], vec![]);
    let block1 = make_block(
        Some((0, genesis.hash)),
        1_001,
        &[100],
        vec![key_spend("snap", 100, vec![0], &[60])],
    );
    ledger.add_block(&genesis).unwrap();
    ledger.add_block(&block1).unwrap();
    (ledger, vec![genesis, block1])
}

#[test]
fn save_then_load_reproduces_indices() {
    let (ledger, blocks) = populated_ledger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.snapshot");
    ledger.save_snapshot(&path).unwrap();

    let restored = Ledger::new(Arc::new(AcceptAllValidator));
    let (_, tip_hash) = ledger.tip().unwrap();
    restored.install_snapshot(&path, tip_hash).unwrap();

    assert_eq!(restored.tip(), ledger.tip());
    assert_eq!(restored.transaction_count(), ledger.transaction_count());
    assert_eq!(restored.output_bucket_len(100), ledger.output_bucket_len(100));
    assert_eq!(restored.output_bucket_len(60), 1);
    assert!(restored.is_spent_key_image(&image("snap")));
    assert_eq!(restored.block_hash_at(0), Some(blocks[0].hash));

    // the derived timestamp index is rebuilt on install
    let (hashes, total) = restored.blocks_within_timestamps(1_000..=1_001, 10);
    assert_eq!(total, 2);
    assert_eq!(hashes, vec![blocks[0].hash, blocks[1].hash]);
}

#[test]
fn tip_mismatch_is_stale_and_leaves_store_untouched() {
    let (ledger, _blocks) = populated_ledger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.snapshot");
    ledger.save_snapshot(&path).unwrap();

    let restored = Ledger::new(Arc::new(AcceptAllValidator));
    let err = restored
        .install_snapshot(&path, h("some-other-tip"))
        .unwrap_err();
    assert!(matches!(
        err,
        SnapshotError::Stale(StaleReason::TipMismatch)
    ));
    assert_eq!(restored.height(), 0);
    assert_eq!(restored.transaction_count(), 0);
}

#[test]
fn older_version_is_stale() {
    let (ledger, _blocks) = populated_ledger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.snapshot");
    ledger.save_snapshot(&path).unwrap();

    patch_byte(&path, 0, 0);

    let restored = Ledger::new(Arc::new(AcceptAllValidator));
    let (_, tip_hash) = ledger.tip().unwrap();
    let err = restored.install_snapshot(&path, tip_hash).unwrap_err();
    assert!(matches!(
        err,
        SnapshotError::Stale(StaleReason::Version(0))
    ));
    assert_eq!(restored.height(), 0);
}

#[test]
fn truncated_body_is_stale_not_partial() {
    let (ledger, _blocks) = populated_ledger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.snapshot");
    ledger.save_snapshot(&path).unwrap();

    // keep the valid header (version + tip) but cut the body short
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..40]).unwrap();

    let restored = Ledger::new(Arc::new(AcceptAllValidator));
    let (_, tip_hash) = ledger.tip().unwrap();
    let err = restored.install_snapshot(&path, tip_hash).unwrap_err();
    assert!(matches!(err, SnapshotError::Stale(StaleReason::Corrupt)));
    assert_eq!(restored.height(), 0);
}

#[test]
fn missing_file_is_an_io_error() {
    let restored = Ledger::new(Arc::new(AcceptAllValidator));
    let err = restored
        .install_snapshot(Path::new("does/not/exist.snapshot"), Hash256::ZERO)
        .unwrap_err();
    assert!(matches!(err, SnapshotError::Io(_)));
}

#[test]
fn resave_replaces_the_previous_file() {
    let (ledger, blocks) = populated_ledger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.snapshot");
    ledger.save_snapshot(&path).unwrap();

    let block2 = make_block(Some((1, blocks[1].hash)), 1_002, &[250], vec![]);
    ledger.add_block(&block2).unwrap();
    ledger.save_snapshot(&path).unwrap();

    let restored = Ledger::new(Arc::new(AcceptAllValidator));
    restored.install_snapshot(&path, block2.hash).unwrap();
    assert_eq!(restored.tip(), Some((2, block2.hash)));
}

fn patch_byte(path: &Path, offset: usize, value: u8) {
    let mut bytes = fs::read(path).unwrap();
    bytes[offset] = value;
    fs::write(path, bytes).unwrap();
}
