//! Ballot Ledger - confidential voting state machine
//!
//! [`VotingLedger`] owns proposals, voter authorization and vote records and
//! enforces every access rule. Votes arrive as ciphertexts and are folded into
//! encrypted running tallies; plaintext counts exist only after a proposal is
//! ended and its tallies are decrypted by an external oracle.
//!
//! [`LocalLedgerNode`] is the execution substrate around it: it verifies
//! signed transactions, runs them one at a time, and publishes the events of
//! each successful transaction.
//!
//! ```text
//! Open ──endVoting──▶ Ended(revealed)
//! ```
//!
//! The intermediate `Ended(unrevealed)` state exists only inside the
//! `endVoting` transition and is never observable.

#![forbid(unsafe_code)]

/// The voting state machine
pub mod ledger;

/// Serial execution node
pub mod node;

/// Root state record and proposals
pub mod state;

pub use ledger::{ExecutionContext, VotingLedger};
pub use node::LocalLedgerNode;
pub use state::{LedgerState, Proposal};
