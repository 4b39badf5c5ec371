//! Ballot Effects - production effect handlers
//!
//! Stateless or self-contained implementations of the effect traits in
//! `ballot-core`. Deterministic and fault-injecting handlers for tests live in
//! `ballot-testkit`, not here.

#![forbid(unsafe_code)]

/// Exponential ElGamal over Ristretto: tally arithmetic, oracle, encryptor
pub mod elgamal;

/// Tracing subscriber setup
pub mod logging;

/// System clock
pub mod time;

/// Keystore-backed wallet and signer
pub mod wallet;

pub use elgamal::{ElGamalOracleHandler, ElGamalTallyHandler, ElGamalVoteEncryptor, TallyKeyPair};
pub use logging::init_tracing;
pub use time::RealTimeHandler;
pub use wallet::{LocalSigner, LocalWallet};
