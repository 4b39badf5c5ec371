//! Effect interfaces for the ballot system
//!
//! Every capability the ledger node or the client service needs from the
//! outside world is expressed as a trait here. Production handlers live in
//! `ballot-effects`; deterministic handlers for tests live in
//! `ballot-testkit`.
//!
//! | Trait                    | Used by        | Production handler      |
//! |--------------------------|----------------|-------------------------|
//! | `PhysicalTimeEffects`    | ledger node    | `RealTimeHandler`       |
//! | `EncryptedTallyEffects`  | ledger         | `ElGamalTallyHandler`   |
//! | `DecryptionEffects`      | ledger node    | `ElGamalOracleHandler`  |
//! | `VoteEncryptionEffects`  | client         | `ElGamalVoteEncryptor`  |
//! | `WalletEffects`          | client         | `LocalWallet`           |
//! | `LedgerEffects`          | client         | `LocalLedgerNode`       |

/// Decryption oracle
pub mod decryption;
/// Client-side vote encryption
pub mod encryption;
/// Ledger endpoint
pub mod ledger;
/// Homomorphic tally arithmetic
pub mod tally;
/// Wall-clock time
pub mod time;
/// Wallet provider capability
pub mod wallet;

pub use decryption::DecryptionEffects;
pub use encryption::VoteEncryptionEffects;
pub use ledger::LedgerEffects;
pub use tally::EncryptedTallyEffects;
pub use time::{PhysicalTimeEffects, TimeError};
pub use wallet::{TransactionSigner, WalletEffects, WalletError};
