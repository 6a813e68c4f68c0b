//! Error types for the fan-out layer.

use lode_core::PublicKey;
use thiserror::Error;

/// Result alias for registry operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Registry-surface errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// No consumer is subscribed under the given view key.
    #[error("no subscription for view key {0}")]
    NotFound(PublicKey),
}

/// Failure reported by a downstream consumer during event delivery. Crosses
/// the isolation boundary as an opaque message: the fan-out logs it and
/// keeps delivering to the remaining consumers.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConsumerError(pub String);

impl ConsumerError {
    /// Build from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
