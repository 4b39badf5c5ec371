//! Opaque ciphertext container
//!
//! The ledger never interprets these bytes; only the tally arithmetic and the
//! decryption oracle know their layout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Encrypted value: a submitted vote or a running tally
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ciphertext {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
}

impl Ciphertext {
    /// Wrap encoded ciphertext bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded length
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the container is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Fingerprint only.
        let head = &self.bytes[..self.bytes.len().min(4)];
        write!(f, "Ciphertext({}…, {} bytes)", hex::encode(head), self.bytes.len())
    }
}
