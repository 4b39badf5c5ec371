//! Oracle that never decrypts

use async_trait::async_trait;
use ballot_core::effects::DecryptionEffects;
use ballot_core::{Ciphertext, Result, VotingError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Reports every decryption as unavailable and counts the attempts
#[derive(Debug, Default)]
pub struct FailingOracle {
    attempts: AtomicUsize,
}

impl FailingOracle {
    /// Create a failing oracle
    pub fn new() -> Self {
        Self::default()
    }

    /// Decryptions requested so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecryptionEffects for FailingOracle {
    async fn decrypt_tally(&self, _tally: &Ciphertext) -> Result<u32> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(VotingError::decryption_unavailable(
            "decryption oracle offline",
        ))
    }
}
