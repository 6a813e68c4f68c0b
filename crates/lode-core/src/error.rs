//! Error types for the data model.

use thiserror::Error;

/// Failure to parse a 32-byte value from its hex form.
#[derive(Debug, Error)]
pub enum HexParseError {
    /// Input was not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Input decoded to the wrong number of bytes.
    #[error("expected 32 bytes, got {0}")]
    WrongLength(usize),
}
