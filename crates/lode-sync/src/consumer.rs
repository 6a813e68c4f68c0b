//! Consumer and listener traits.
//!
//! A consumer is the per-account subscriber that keeps derived state (a
//! balance view, typically) in step with the ledger. Listeners are
//! lightweight external observers attached to a consumer; the registry
//! holds them weakly and never manages their lifetime.

use crate::error::ConsumerError;
use lode_core::{Hash256, PublicKey};
use lode_ledger::ContainerHandle;
use std::sync::Arc;

/// Per-account subscriber, keyed by its public view key.
///
/// Each callback corresponds to one ledger event; a returned error is
/// isolated by the fan-out and never interrupts delivery to other
/// consumers, nor does it roll back the ledger mutation that triggered it.
pub trait Consumer: Send + Sync {
    /// The view key this consumer is subscribed under.
    fn view_key(&self) -> PublicKey;

    /// Blocks were appended to the chain.
    fn on_blocks_added(&self, hashes: &[Hash256]) -> Result<(), ConsumerError>;

    /// Removal of one transaction is starting; the consumer may stage a
    /// transactional removal between this and the matching end event.
    fn on_transaction_delete_begin(&self, hash: Hash256) -> Result<(), ConsumerError>;

    /// Removal of one transaction has completed.
    fn on_transaction_delete_end(&self, hash: Hash256) -> Result<(), ConsumerError>;

    /// The chain was rolled back; resume from `new_height`. The ledger may
    /// safely be queried at its new tip from inside this callback.
    fn on_blockchain_detach(&self, new_height: u32) -> Result<(), ConsumerError>;

    /// A transaction changed confirmation status; `containers` names the
    /// downstream state that needs a partial refresh.
    fn on_transaction_updated(
        &self,
        hash: Hash256,
        containers: &[ContainerHandle],
    ) -> Result<(), ConsumerError>;
}

/// External notification listener attached to one consumer's subscription.
/// All callbacks default to no-ops so implementors pick what they need.
pub trait SyncListener: Send + Sync {
    /// Blocks reached the consumer subscribed under `view_key`.
    fn on_blocks_added(&self, _view_key: PublicKey, _hashes: &[Hash256]) {}

    /// Transaction removal started for `view_key`'s consumer.
    fn on_transaction_delete_begin(&self, _view_key: PublicKey, _hash: Hash256) {}

    /// Transaction removal finished for `view_key`'s consumer.
    fn on_transaction_delete_end(&self, _view_key: PublicKey, _hash: Hash256) {}

    /// The chain detached for `view_key`'s consumer.
    fn on_blockchain_detach(&self, _view_key: PublicKey, _new_height: u32) {}

    /// A transaction update reached `view_key`'s consumer.
    fn on_transaction_updated(
        &self,
        _view_key: PublicKey,
        _hash: Hash256,
        _containers: &[ContainerHandle],
    ) {
    }
}

/// Builds the consumer for a view key at subscribe time. Keeps the registry
/// independent of any concrete wallet implementation.
pub trait ConsumerFactory: Send + Sync {
    /// Create the consumer backing a new subscription.
    fn create(&self, view_key: PublicKey) -> Arc<dyn Consumer>;
}
