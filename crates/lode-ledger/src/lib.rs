//! Ledger state store for the lode workspace.
//!
//! The source of truth for accepted blocks and transactions: an append-only
//! block index, a transaction map, per-amount output indices (single-key
//! and multisignature), and the spent key image set, all mutated together
//! under a single-writer discipline.
//!
//! Three properties drive the design:
//!
//! - **All-or-nothing acceptance**: every check a block must pass runs
//!   before any index is touched, so a rejection leaves no trace.
//! - **Exact reversal**: detaching to a pre-add height restores every index
//!   bit-for-bit, which is what makes chain reorganization safe.
//! - **Ordered observation**: each mutation's events reach every registered
//!   observer before the next mutation starts.
//!
//! Snapshot persistence ([`Ledger::save_snapshot`] /
//! [`Ledger::install_snapshot`]) is versioned, tip-tagged, and
//! all-or-nothing: a mismatched snapshot degrades to a full replay instead
//! of a partial load.

mod error;
mod events;
mod multisig_index;
mod output_index;
mod snapshot;
mod spent_images;
mod state;
mod store;
mod timestamp_index;
mod validator;

pub use error::{LedgerError, Result, SnapshotError, StaleReason};
pub use events::{ContainerHandle, LedgerObserver};
pub use multisig_index::{MultisigOutputIndex, MultisigOutputRecord};
pub use output_index::{OutputIndex, OutputRecord};
pub use snapshot::{SnapshotData, SNAPSHOT_VERSION};
pub use spent_images::SpentImageSet;
pub use state::{StoredBlock, TransactionEntry};
pub use store::Ledger;
pub use timestamp_index::TimestampIndex;
pub use validator::{AcceptAllValidator, TransactionValidator};
