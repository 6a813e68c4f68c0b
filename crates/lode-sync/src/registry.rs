//! Subscription registry.
//!
//! Maps view keys to consumers and their listener sets. Iteration order is
//! insertion order, and that order is part of the delivery contract, hence
//! the `IndexMap`. The registry owns consumers; listeners are held weakly
//! and dead handles are pruned opportunistically.

use crate::consumer::{Consumer, ConsumerFactory, SyncListener};
use crate::error::{Result, SyncError};
use indexmap::IndexMap;
use lode_core::PublicKey;
use std::sync::{Arc, Weak};

struct Subscription {
    consumer: Arc<dyn Consumer>,
    listeners: Vec<Weak<dyn SyncListener>>,
}

/// Registry of active subscriptions, keyed by public view key.
pub struct ConsumerRegistry {
    factory: Box<dyn ConsumerFactory>,
    entries: IndexMap<PublicKey, Subscription>,
}

impl ConsumerRegistry {
    /// Create an empty registry that builds consumers with `factory`.
    pub fn new(factory: Box<dyn ConsumerFactory>) -> Self {
        Self {
            factory,
            entries: IndexMap::new(),
        }
    }

    /// Subscribe a view key, creating its consumer on first call.
    /// Idempotent: a repeated subscribe returns the existing consumer.
    pub fn subscribe(&mut self, view_key: PublicKey) -> Arc<dyn Consumer> {
        if let Some(subscription) = self.entries.get(&view_key) {
            return Arc::clone(&subscription.consumer);
        }
        let consumer = self.factory.create(view_key);
        self.entries.insert(
            view_key,
            Subscription {
                consumer: Arc::clone(&consumer),
                listeners: Vec::new(),
            },
        );
        consumer
    }

    /// Look up the consumer for a view key.
    pub fn consumer(&self, view_key: &PublicKey) -> Option<Arc<dyn Consumer>> {
        self.entries
            .get(view_key)
            .map(|subscription| Arc::clone(&subscription.consumer))
    }

    /// Remove a subscription along with all of its listeners.
    pub fn unsubscribe(&mut self, view_key: &PublicKey) -> Result<()> {
        // shift_remove keeps the remaining entries in insertion order.
        self.entries
            .shift_remove(view_key)
            .map(|_| ())
            .ok_or(SyncError::NotFound(*view_key))
    }

    /// Attach a listener to an existing subscription. The registry keeps
    /// only a weak handle; dropping the listener elsewhere detaches it.
    pub fn add_listener(
        &mut self,
        view_key: &PublicKey,
        listener: &Arc<dyn SyncListener>,
    ) -> Result<()> {
        let subscription = self
            .entries
            .get_mut(view_key)
            .ok_or(SyncError::NotFound(*view_key))?;
        subscription.listeners.retain(|weak| weak.strong_count() > 0);
        subscription.listeners.push(Arc::downgrade(listener));
        Ok(())
    }

    /// Detach a previously added listener.
    pub fn remove_listener(
        &mut self,
        view_key: &PublicKey,
        listener: &Arc<dyn SyncListener>,
    ) -> Result<()> {
        let subscription = self
            .entries
            .get_mut(view_key)
            .ok_or(SyncError::NotFound(*view_key))?;
        let target = Arc::downgrade(listener);
        subscription
            .listeners
            .retain(|weak| weak.strong_count() > 0 && !Weak::ptr_eq(weak, &target));
        Ok(())
    }

    /// Subscribed view keys in insertion order.
    pub fn subscriptions(&self) -> Vec<PublicKey> {
        self.entries.keys().copied().collect()
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tear down every subscription.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Visit each subscription in insertion order: the consumer first, then
    /// its live listeners in registration order.
    pub(crate) fn visit(
        &self,
        mut f: impl FnMut(PublicKey, &Arc<dyn Consumer>, &[Weak<dyn SyncListener>]),
    ) {
        for (view_key, subscription) in &self.entries {
            f(*view_key, &subscription.consumer, &subscription.listeners);
        }
    }
}
