//! Primitive data model for the lode ledger core.
//!
//! This crate defines the types the state store and the synchronization
//! fan-out agree on: 256-bit hashes and keys, the block and transaction
//! structures, and [`CompleteBlock`], the decoded candidate unit a driver
//! hands to the store. Wire decoding and signature verification live
//! outside this workspace; everything here is already-decoded data.

mod block;
mod error;
mod hash;
mod transaction;

pub use block::{Block, BlockHeader, CompleteBlock};
pub use error::HexParseError;
pub use hash::{Hash256, KeyImage, PublicKey};
pub use transaction::{
    KeyInput, MultisignatureInput, OutputTarget, Transaction, TransactionInput, TransactionOutput,
};
