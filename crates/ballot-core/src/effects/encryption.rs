//! Client-side vote encryption

use std::sync::Arc;

use crate::{Ciphertext, Result};

/// Encrypts a yes/no choice under the ledger's tally key
pub trait VoteEncryptionEffects: Send + Sync {
    /// Encrypt `support` as 1 (yes) or 0 (no) with fresh randomness
    ///
    /// The result is a ballot: the ciphertext plus a proof that it encrypts
    /// 0 or 1, as checked by the ledger's tally handler.
    fn encrypt_vote(&self, support: bool) -> Result<Ciphertext>;
}

impl<T: VoteEncryptionEffects + ?Sized> VoteEncryptionEffects for Arc<T> {
    fn encrypt_vote(&self, support: bool) -> Result<Ciphertext> {
        (**self).encrypt_vote(support)
    }
}
