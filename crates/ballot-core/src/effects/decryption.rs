//! Decryption oracle
//!
//! # Effect Classification
//!
//! - **Category**: External service
//! - **Implementation**: `ballot-effects::ElGamalOracleHandler`, `ballot-testkit::FailingOracle`
//! - **Usage**: the ledger node, only when a proposal is ended

use async_trait::async_trait;
use std::sync::Arc;

use crate::{Ciphertext, Result};

/// Turns an encrypted tally into its plaintext count
#[async_trait]
pub trait DecryptionEffects: Send + Sync {
    /// Decrypt a tally
    ///
    /// Any failure is reported as `DecryptionUnavailable` by the caller; the
    /// ledger leaves the proposal untouched in that case.
    async fn decrypt_tally(&self, tally: &Ciphertext) -> Result<u32>;
}

#[async_trait]
impl<T: DecryptionEffects + ?Sized> DecryptionEffects for Arc<T> {
    async fn decrypt_tally(&self, tally: &Ciphertext) -> Result<u32> {
        (**self).decrypt_tally(tally).await
    }
}
