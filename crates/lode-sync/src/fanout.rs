//! Event fan-out from the ledger to subscribed consumers.
//!
//! Implements [`LedgerObserver`]: each ledger event is delivered to every
//! consumer in registry insertion order, and within a consumer to its
//! listeners in registration order. A failing consumer is logged and
//! counted, and never allowed to stop delivery to the rest: one misbehaving
//! subscriber must not starve the others or corrupt the ledger. The
//! non-reentrancy of events across mutations comes from the ledger's own
//! mutation lock; the fan-out holds the registry read lock for the span of
//! a single event only.

use crate::consumer::{Consumer, SyncListener};
use crate::error::ConsumerError;
use crate::registry::ConsumerRegistry;
use lode_core::{Hash256, PublicKey};
use lode_ledger::{ContainerHandle, LedgerObserver};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Dispatches ledger mutation events to the consumer registry.
pub struct SyncFanout {
    registry: Arc<RwLock<ConsumerRegistry>>,
    failures: AtomicU64,
}

impl SyncFanout {
    /// Create a fan-out over a shared registry.
    pub fn new(registry: Arc<RwLock<ConsumerRegistry>>) -> Self {
        Self {
            registry,
            failures: AtomicU64::new(0),
        }
    }

    /// The registry this fan-out delivers to.
    pub fn registry(&self) -> &Arc<RwLock<ConsumerRegistry>> {
        &self.registry
    }

    /// Number of consumer callbacks that returned an error since creation.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    fn dispatch(
        &self,
        event: &'static str,
        consumer_call: impl Fn(&dyn Consumer) -> Result<(), ConsumerError>,
        listener_call: impl Fn(&dyn SyncListener, PublicKey),
    ) {
        let registry = self.registry.read();
        registry.visit(|view_key, consumer, listeners| {
            if let Err(error) = consumer_call(consumer.as_ref()) {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(%view_key, %error, event, "consumer failed, continuing delivery");
            }
            for weak in listeners {
                if let Some(listener) = weak.upgrade() {
                    listener_call(listener.as_ref(), view_key);
                }
            }
        });
    }
}

impl LedgerObserver for SyncFanout {
    fn blocks_added(&self, hashes: &[Hash256]) {
        self.dispatch(
            "blocks_added",
            |consumer| consumer.on_blocks_added(hashes),
            |listener, view_key| listener.on_blocks_added(view_key, hashes),
        );
    }

    fn transaction_delete_begin(&self, hash: Hash256) {
        self.dispatch(
            "transaction_delete_begin",
            |consumer| consumer.on_transaction_delete_begin(hash),
            |listener, view_key| listener.on_transaction_delete_begin(view_key, hash),
        );
    }

    fn transaction_delete_end(&self, hash: Hash256) {
        self.dispatch(
            "transaction_delete_end",
            |consumer| consumer.on_transaction_delete_end(hash),
            |listener, view_key| listener.on_transaction_delete_end(view_key, hash),
        );
    }

    fn blockchain_detach(&self, new_height: u32) {
        self.dispatch(
            "blockchain_detach",
            |consumer| consumer.on_blockchain_detach(new_height),
            |listener, view_key| listener.on_blockchain_detach(view_key, new_height),
        );
    }

    fn transaction_updated(&self, hash: Hash256, containers: &[ContainerHandle]) {
        self.dispatch(
            "transaction_updated",
            |consumer| consumer.on_transaction_updated(hash, containers),
            |listener, view_key| listener.on_transaction_updated(view_key, hash, containers),
        );
    }
}
