//! Ballot Core - shared vocabulary of the confidential ballot system
//!
//! This crate holds the types every other layer agrees on and nothing else:
//! identifiers, the unified error type, the ledger wire protocol, and the
//! effect interfaces that the ledger node and the client service are written
//! against. It contains no handlers; those live in `ballot-effects`.
//!
//! # Layers
//!
//! - `ballot-core`: types and effect traits (this crate)
//! - `ballot-effects`: production handlers (clock, ElGamal tallies, wallet)
//! - `ballot-ledger`: the voting state machine and its local execution node
//! - `ballot-client`: the wallet-bound client service
//! - `ballot-testkit`: deterministic fixtures for tests

#![forbid(unsafe_code)]

/// Unified error handling
pub mod errors;

/// Account, proposal, chain and transaction identifiers
pub mod identifiers;

/// Time types for ledger timestamps
pub mod time;

/// Opaque ciphertext container
pub mod ciphertext;

/// Ledger calls, events, transactions and receipts
pub mod protocol;

/// Network and client configuration
pub mod config;

/// Effect interfaces (no implementations)
pub mod effects;

pub use ciphertext::Ciphertext;
pub use config::{ClientConfig, ConfigValidation, LedgerConfig, NativeCurrency, NetworkConfig};
pub use errors::{Result, VotingError};
pub use identifiers::{Address, ChainId, ProposalId, TxHash};
pub use protocol::{
    CallOutput, EventRecord, LedgerCall, LedgerEvent, ProposalInfo, SignedTransaction, TxReceipt,
    UnsignedTransaction, VoteResults,
};
pub use time::PhysicalTime;

/// Maximum description length accepted by the ledger, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Length of the voting window opened by every proposal, in seconds.
pub const VOTING_PERIOD_SECS: u64 = 7 * 24 * 60 * 60;
