//! Core identifier types used across the ballot workspace
//!
//! Accounts are identified by 20-byte addresses derived from their ed25519
//! verifying keys, proposals by dense sequential integers, transactions by
//! the BLAKE3 hash of their signed encoding.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::VotingError;

/// Account identity on the ledger
///
/// Rendered as `0x`-prefixed lowercase hex. Parsing accepts either case, so
/// addresses typed by users and addresses read from config compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The null identity
    pub const ZERO: Address = Address([0u8; 20]);

    /// Derive the account address owned by an ed25519 verifying key
    pub fn from_verifying_key(key: &[u8; 32]) -> Self {
        let digest = blake3::hash(key);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.as_bytes()[12..]);
        Self(bytes)
    }

    /// Derive the address of a ledger deployed by `deployer`
    pub fn derive_ledger(deployer: &Address, chain_id: ChainId) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"ballot-ledger");
        hasher.update(&deployer.0);
        hasher.update(&chain_id.0.to_be_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hasher.finalize().as_bytes()[12..]);
        Self(bytes)
    }

    /// Whether this is the null identity
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = VotingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let decoded = hex::decode(digits)
            .map_err(|e| VotingError::invalid_argument(format!("invalid address {s:?}: {e}")))?;
        let bytes: [u8; 20] = decoded.try_into().map_err(|_| {
            VotingError::invalid_argument(format!("invalid address {s:?}: expected 20 bytes"))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Proposal identifier, assigned densely from 0 in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub u64);

impl ProposalId {
    /// Numeric value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Position in the ledger's proposal list
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proposal-{}", self.0)
    }
}

impl From<u64> for ProposalId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ProposalId> for u64 {
    fn from(id: ProposalId) -> Self {
        id.0
    }
}

/// Network identifier a wallet and a ledger must agree on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Hex quantity form used in wallet switch/add requests, e.g. `0x2328`
    pub fn to_hex_quantity(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Transaction identifier: BLAKE3 of the signed transaction encoding
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    /// Hash arbitrary bytes into a transaction identifier
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({self})")
    }
}
