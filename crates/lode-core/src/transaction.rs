//! Transaction structure: inputs, outputs, and the transaction itself.

use crate::hash::{KeyImage, PublicKey};
use serde::{Deserialize, Serialize};

/// A key input: spends `amount` by referencing existing outputs in that
/// amount bucket and publishing the key image that marks them spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    /// Denomination of the outputs being spent.
    pub amount: u64,
    /// Local indices into the `amount` bucket of the output index.
    pub output_indexes: Vec<u32>,
    /// One-time tag; a second appearance anywhere is a double-spend.
    pub key_image: KeyImage,
}

/// A multisignature input referencing one multisig output by global index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisignatureInput {
    /// Denomination of the output being spent.
    pub amount: u64,
    /// Number of signatures accompanying the spend.
    pub signature_count: u8,
    /// Global index into the `amount` bucket of the multisig index.
    pub output_index: u32,
}

/// One input of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionInput {
    /// Coinbase input; carries only the height of the block that mints it.
    Base {
        /// Height of the containing block.
        block_height: u32,
    },
    /// Spend of single-key outputs.
    Key(KeyInput),
    /// Spend of a multisignature output.
    Multisignature(MultisignatureInput),
}

/// Where an output's value can be claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputTarget {
    /// Single-key output.
    Key(PublicKey),
    /// Multisignature output: any `required_signatures` of `keys` may spend.
    Multisignature {
        /// Participant public keys.
        keys: Vec<PublicKey>,
        /// Signatures required to spend.
        required_signatures: u8,
    },
}

/// One output of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    /// Denomination; selects the bucket the output is indexed under.
    pub amount: u64,
    /// Claim condition.
    pub target: OutputTarget,
}

/// A decoded transaction as the ledger stores it. Signatures are checked by
/// the external validator before a block reaches the store and are not
/// retained here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Format version.
    pub version: u8,
    /// Height or timestamp before which outputs cannot be spent.
    pub unlock_time: u64,
    /// Inputs in acceptance order.
    pub inputs: Vec<TransactionInput>,
    /// Outputs in acceptance order; positions define index assignment order.
    pub outputs: Vec<TransactionOutput>,
    /// Opaque extra bytes.
    pub extra: Vec<u8>,
}

impl Transaction {
    /// Key images published by this transaction's key inputs, in input order.
    pub fn key_images(&self) -> impl Iterator<Item = KeyImage> + '_ {
        self.inputs.iter().filter_map(|input| match input {
            TransactionInput::Key(key_input) => Some(key_input.key_image),
            _ => None,
        })
    }

    /// True when the only input is a base (coinbase) input.
    pub fn is_coinbase(&self) -> bool {
        matches!(
            self.inputs.as_slice(),
            [TransactionInput::Base { .. }]
        )
    }

    /// Rough serialized size, used for the external size check. This is an
    /// estimate over the decoded form, not the wire blob.
    pub fn binary_size(&self) -> usize {
        let inputs: usize = self
            .inputs
            .iter()
            .map(|input| match input {
                TransactionInput::Base { .. } => 5,
                TransactionInput::Key(k) => 41 + 4 * k.output_indexes.len(),
                TransactionInput::Multisignature(_) => 14,
            })
            .sum();
        let outputs: usize = self
            .outputs
            .iter()
            .map(|output| match &output.target {
                OutputTarget::Key(_) => 41,
                OutputTarget::Multisignature { keys, .. } => 10 + 32 * keys.len(),
            })
            .sum();
        10 + inputs + outputs + self.extra.len()
    }
}
