//! Ledger wire protocol
//!
//! Calls are what a signed transaction asks the ledger to do; events are what
//! the ledger emits when a call succeeds. Reads (`ProposalInfo`,
//! `VoteResults`) are served without a transaction.
//!
//! ```text
//! UnsignedTransaction --sign--> SignedTransaction --submit--> TxReceipt
//!                                                               └─ Vec<EventRecord>
//! ```

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::{Address, ChainId, Ciphertext, ProposalId, Result, TxHash, VotingError};

/// State-mutating ledger operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCall {
    /// Grant voting rights (admin only)
    AuthorizeVoter {
        /// Account to authorize
        voter: Address,
    },
    /// Withdraw voting rights (admin only, never the admin itself)
    RevokeVoter {
        /// Account to revoke
        voter: Address,
    },
    /// Open a new proposal (admin only)
    CreateProposal {
        /// Proposal text, 1 to 1000 characters
        description: String,
    },
    /// Cast an encrypted yes/no vote
    Vote {
        /// Target proposal
        proposal_id: ProposalId,
        /// Encrypted 0/1 choice
        encrypted_vote: Ciphertext,
    },
    /// Close a proposal and reveal its tallies (admin only)
    EndVoting {
        /// Target proposal
        proposal_id: ProposalId,
    },
}

impl LedgerCall {
    /// Method name, used as a logging field
    pub fn name(&self) -> &'static str {
        match self {
            LedgerCall::AuthorizeVoter { .. } => "authorizeVoter",
            LedgerCall::RevokeVoter { .. } => "revokeVoter",
            LedgerCall::CreateProposal { .. } => "createProposal",
            LedgerCall::Vote { .. } => "vote",
            LedgerCall::EndVoting { .. } => "endVoting",
        }
    }
}

/// Events emitted on ledger state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A proposal was opened
    ProposalCreated {
        /// Assigned identifier
        proposal_id: ProposalId,
        /// Proposal text
        description: String,
        /// Voting deadline, seconds since the Unix epoch
        end_time: u64,
    },
    /// An authorized voter cast a vote
    VoteCast {
        /// Target proposal
        proposal_id: ProposalId,
        /// Voter account
        voter: Address,
    },
    /// A proposal was closed and revealed
    ProposalEnded {
        /// Closed proposal
        proposal_id: ProposalId,
        /// Revealed yes tally
        yes_votes: u32,
        /// Revealed no tally
        no_votes: u32,
    },
    /// An account was granted voting rights
    VoterAuthorized {
        /// Authorized account
        voter: Address,
    },
    /// An account lost voting rights
    VoterRevoked {
        /// Revoked account
        voter: Address,
    },
}

impl LedgerEvent {
    /// Event name as it appears in the ledger's event surface
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::ProposalCreated { .. } => "ProposalCreated",
            LedgerEvent::VoteCast { .. } => "VoteCast",
            LedgerEvent::ProposalEnded { .. } => "ProposalEnded",
            LedgerEvent::VoterAuthorized { .. } => "VoterAuthorized",
            LedgerEvent::VoterRevoked { .. } => "VoterRevoked",
        }
    }
}

/// Public fields of a proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalInfo {
    /// Proposal text
    pub description: String,
    /// Voting deadline, seconds since the Unix epoch
    pub end_time: u64,
    /// Voting closed
    pub ended: bool,
    /// Tallies decrypted and published
    pub revealed: bool,
}

/// Revealed tallies of a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResults {
    /// Number of yes votes
    pub yes_votes: u32,
    /// Number of no votes
    pub no_votes: u32,
}

/// Return value of a successful call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutput {
    /// Call returns nothing
    Unit,
    /// `createProposal` returns the new identifier
    ProposalId(ProposalId),
}

/// A call addressed to a specific ledger on a specific chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Chain the transaction is valid on
    pub chain_id: ChainId,
    /// Ledger address
    pub to: Address,
    /// Random salt making otherwise identical calls distinct
    pub salt: u64,
    /// Requested operation
    pub call: LedgerCall,
}

impl UnsignedTransaction {
    /// Build a transaction
    pub fn new(chain_id: ChainId, to: Address, salt: u64, call: LedgerCall) -> Self {
        Self {
            chain_id,
            to,
            salt,
            call,
        }
    }

    /// Canonical bytes covered by the signature
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }
}

/// Transaction with the sender's ed25519 signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Signed payload
    pub tx: UnsignedTransaction,
    /// Sender's verifying key
    pub public_key: [u8; 32],
    /// ed25519 signature over `tx.signing_bytes()`
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

impl SignedTransaction {
    /// Sign `tx` with `key`
    pub fn sign(tx: UnsignedTransaction, key: &SigningKey) -> Result<Self> {
        let signature = key.sign(&tx.signing_bytes()?);
        Ok(Self {
            tx,
            public_key: key.verifying_key().to_bytes(),
            signature: signature.to_bytes().to_vec(),
        })
    }

    /// Address the transaction claims to come from
    pub fn sender(&self) -> Address {
        Address::from_verifying_key(&self.public_key)
    }

    /// Check the signature and return the authenticated sender
    pub fn verify(&self) -> Result<Address> {
        let key = VerifyingKey::from_bytes(&self.public_key)
            .map_err(|e| VotingError::unauthorized(format!("invalid sender key: {e}")))?;
        let raw: [u8; 64] = self
            .signature
            .as_slice()
            .try_into()
            .map_err(|_| VotingError::unauthorized("malformed transaction signature"))?;
        key.verify(&self.tx.signing_bytes()?, &Signature::from_bytes(&raw))
            .map_err(|_| VotingError::unauthorized("invalid transaction signature"))?;
        Ok(self.sender())
    }

    /// Transaction identifier
    pub fn hash(&self) -> Result<TxHash> {
        Ok(TxHash::of(&bincode::serialize(self)?))
    }
}

/// One emitted event with its inclusion coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Block that included the transaction
    pub block_number: u64,
    /// Emitting transaction
    pub tx_hash: TxHash,
    /// Position within the transaction's events
    pub log_index: u32,
    /// The event
    pub event: LedgerEvent,
}

/// Result of an included transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction identifier
    pub tx_hash: TxHash,
    /// Inclusion block
    pub block_number: u64,
    /// Authenticated sender
    pub from: Address,
    /// Call return value
    pub output: CallOutput,
    /// Events emitted by the call, in order
    pub events: Vec<EventRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    fn sample_tx() -> UnsignedTransaction {
        UnsignedTransaction::new(
            ChainId(9000),
            Address([7u8; 20]),
            42,
            LedgerCall::CreateProposal {
                description: "Adopt the new charter?".to_string(),
            },
        )
    }

    #[test]
    fn signed_transaction_verifies_to_sender() {
        let signing = key(1);
        let signed = SignedTransaction::sign(sample_tx(), &signing).unwrap();
        let expected = Address::from_verifying_key(&signing.verifying_key().to_bytes());
        assert_eq!(signed.verify().unwrap(), expected);
    }

    #[test]
    fn tampered_call_fails_verification() {
        let mut signed = SignedTransaction::sign(sample_tx(), &key(1)).unwrap();
        signed.tx.call = LedgerCall::CreateProposal {
            description: "Something else".to_string(),
        };
        assert!(matches!(
            signed.verify(),
            Err(VotingError::Unauthorized { .. })
        ));
    }

    #[test]
    fn swapped_key_fails_verification() {
        let mut signed = SignedTransaction::sign(sample_tx(), &key(1)).unwrap();
        signed.public_key = key(2).verifying_key().to_bytes();
        assert!(signed.verify().is_err());
    }

    #[test]
    fn salt_changes_hash() {
        let a = SignedTransaction::sign(sample_tx(), &key(1)).unwrap();
        let mut tx = sample_tx();
        tx.salt = 43;
        let b = SignedTransaction::sign(tx, &key(1)).unwrap();
        assert_ne!(a.hash().unwrap(), b.hash().unwrap());
    }
}
