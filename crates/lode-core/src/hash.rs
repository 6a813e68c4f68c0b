//! 256-bit identifier newtypes.
//!
//! `Hash256` names blocks and transactions, `PublicKey` identifies output
//! targets and subscriber view keys, `KeyImage` is the one-time tag a spent
//! key input leaves behind. All three are plain 32-byte values with hex
//! display; none of them carries cryptographic behaviour here.

use crate::error::HexParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! bytes32_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
        )]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// The all-zero value, used as the previous-hash of a genesis block.
            pub const ZERO: Self = Self([0u8; 32]);

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = HexParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = hex::decode(s)?;
                let arr: [u8; 32] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| HexParseError::WrongLength(bytes.len()))?;
                Ok(Self(arr))
            }
        }
    };
}

bytes32_newtype!(
    /// A 256-bit block or transaction hash.
    Hash256
);

bytes32_newtype!(
    /// A 256-bit public key (output target key or subscriber view key).
    PublicKey
);

bytes32_newtype!(
    /// A one-time key image derived from a spent output's key.
    KeyImage
);
