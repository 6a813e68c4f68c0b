//! Synchronization fan-out for the lode ledger.
//!
//! Distributes ledger mutation events (blocks added, per-transaction
//! delete brackets, chain detach, confirmation updates) to independently
//! subscribed consumers so that wallet-style balance trackers stay
//! consistent with the ledger without rescanning from genesis.
//!
//! Structure:
//!
//! - [`Consumer`] / [`SyncListener`]: the subscriber surfaces. Consumers
//!   are owned by the registry and keyed by view key; listeners are weak
//!   external handles attached per subscription.
//! - [`ConsumerRegistry`]: idempotent subscribe by view key, insertion-
//!   order listing, listener management.
//! - [`SyncFanout`]: the [`LedgerObserver`](lode_ledger::LedgerObserver)
//!   implementation wired into the ledger; isolates per-consumer failures.

mod consumer;
mod error;
mod fanout;
mod registry;

pub use consumer::{Consumer, ConsumerFactory, SyncListener};
pub use error::{ConsumerError, Result, SyncError};
pub use fanout::SyncFanout;
pub use registry::ConsumerRegistry;

pub use lode_ledger::ContainerHandle;
