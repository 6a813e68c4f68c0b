//! Ledger mutation events.
//!
//! The store emits a closed set of events to registered observers. A single
//! mutation's events are always delivered to completion before the next
//! mutation begins (the store serializes mutation and emission under one
//! exclusion region), so observers never see interleaved mutations.

use lode_core::Hash256;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque handle to a downstream container affected by a transaction
/// update, letting consumers refresh partially instead of rescanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerHandle(pub Uuid);

impl ContainerHandle {
    /// Fresh random handle.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container-{}", self.0)
    }
}

/// Receiver of ledger mutation events.
///
/// Delivery order per mutation:
/// - `add_block` success ⇒ one `blocks_added` with the new hashes.
/// - `detach_to_height` ⇒ a `transaction_delete_begin`/`_end` pair per
///   removed transaction (blocks tip-down, transactions in reverse of
///   acceptance order, coinbase last), then exactly one
///   `blockchain_detach` with the new height.
/// - A confirmation-status change ⇒ one `transaction_updated`.
///
/// Implementations must not call back into store mutations; queries are
/// safe at any point and observe the post-event state once
/// `blockchain_detach` / `blocks_added` arrives.
pub trait LedgerObserver: Send + Sync {
    /// Blocks were appended to the chain.
    fn blocks_added(&self, hashes: &[Hash256]);

    /// Removal of one transaction is starting.
    fn transaction_delete_begin(&self, hash: Hash256);

    /// Removal of one transaction has completed.
    fn transaction_delete_end(&self, hash: Hash256);

    /// All blocks above `new_height` have been removed.
    fn blockchain_detach(&self, new_height: u32);

    /// A held transaction changed confirmation status without deletion.
    fn transaction_updated(&self, hash: Hash256, containers: &[ContainerHandle]);
}
