//! Ballot Testkit - deterministic fixtures
//!
//! Handlers that make time, wallet behaviour and decryption failures
//! scriptable, plus [`TestNetwork`], a ledger node wired to them.

#![forbid(unsafe_code)]

/// Manually advanced clock
pub mod clock;

/// Oracle that never decrypts
pub mod oracle;

/// Scriptable wallet provider
pub mod wallet;

/// Pre-wired local network
pub mod network;

pub use clock::ManualClock;
pub use network::{TestNetwork, GENESIS_SECS};
pub use oracle::FailingOracle;
pub use wallet::{ScriptedWallet, WalletCall};
