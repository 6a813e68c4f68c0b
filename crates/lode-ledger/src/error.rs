//! Error types for the state store and snapshot paths.

use lode_core::{Hash256, KeyImage};
use thiserror::Error;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Rejections raised by `add_block` / `detach_to_height`. Every variant is
/// fully recovered locally: when one of these is returned, no index was
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Candidate block does not sit directly on the current tip.
    #[error("block does not extend the tip: expected height {expected_height} on top of {expected_previous}")]
    InvalidHeightLinkage {
        /// Height the next block must have.
        expected_height: u32,
        /// Hash the next block must name as its predecessor.
        expected_previous: Hash256,
    },

    /// A key input republishes a key image that is already spent.
    #[error("double-spend: key image {0} is already spent")]
    DoubleSpend(KeyImage),

    /// A multisignature input spends an output that is already spent.
    #[error("double-spend: multisignature output {amount}:{index} is already spent")]
    MultisigDoubleSpend {
        /// Amount bucket of the reused output.
        amount: u64,
        /// Global index of the reused output.
        index: u32,
    },

    /// An input references an output index that does not exist.
    #[error("referenced output {amount}:{index} does not exist")]
    InvalidReference {
        /// Amount bucket of the missing output.
        amount: u64,
        /// Referenced index within the bucket.
        index: u32,
    },

    /// Detach target above the tip, or detach on an empty chain.
    #[error("detach target {target} out of range (tip {tip})")]
    InvalidHeight {
        /// Requested height.
        target: u32,
        /// Current tip height.
        tip: u32,
    },

    /// The candidate carries a transaction hash the ledger already holds,
    /// or repeats a hash within the same block.
    #[error("transaction {0} is already in the ledger")]
    DuplicateTransaction(Hash256),

    /// The external transaction validator rejected a transaction.
    #[error("transaction {0} rejected by validator")]
    ValidationFailed(Hash256),

    /// An update notification named a transaction the ledger does not hold.
    #[error("transaction {0} is not in the ledger")]
    UnknownTransaction(Hash256),
}

/// Why a snapshot was discarded instead of installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// On-disk version differs from the current archive version.
    Version(u8),
    /// Snapshot was taken at a different tip than the one expected.
    TipMismatch,
    /// The index body failed to decode.
    Corrupt,
}

/// Snapshot save/load failures. `Stale` is the expected degraded path: the
/// caller rebuilds by replaying block history. `Io` is an environment
/// problem and is only surfaced, never partially applied.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Snapshot does not correspond to the expected tip or version; rebuild.
    #[error("stale snapshot: {0:?}")]
    Stale(StaleReason),

    /// Underlying I/O failure.
    #[error("snapshot i/o: {0}")]
    Io(#[from] std::io::Error),
}
