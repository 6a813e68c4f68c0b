//! External transaction validation collaborator.

use lode_core::Transaction;

/// Checks performed by the consensus layer before the store commits a
/// transaction. The store itself never verifies signatures or ring
/// semantics; it only consults this collaborator.
pub trait TransactionValidator: Send + Sync {
    /// Validate a transaction's inputs (signatures, ring members, unlock
    /// rules). `false` rejects the containing block.
    fn check_transaction_inputs(&self, tx: &Transaction) -> bool;

    /// Validate the serialized size of a transaction blob.
    fn check_transaction_size(&self, blob_size: usize) -> bool;
}

/// Validator that accepts everything. Useful for tests and for drivers that
/// validate before submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllValidator;

impl TransactionValidator for AcceptAllValidator {
    fn check_transaction_inputs(&self, _tx: &Transaction) -> bool {
        true
    }

    fn check_transaction_size(&self, _blob_size: usize) -> bool {
        true
    }
}
