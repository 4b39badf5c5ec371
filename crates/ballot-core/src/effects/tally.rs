//! Homomorphic tally arithmetic
//!
//! The ledger keeps one running ciphertext per (proposal, choice). A vote is
//! folded into the yes tally as-is and into the no tally as its complement,
//! so the ledger never learns which way anyone voted. Submitted ballots carry
//! a proof that they encrypt 0 or 1; [`EncryptedTallyEffects::validate`]
//! checks it and yields the ciphertext that is folded in.
//!
//! # Effect Classification
//!
//! - **Category**: Pure computation over public keys
//! - **Implementation**: `ballot-effects::ElGamalTallyHandler`
//! - **Usage**: the ledger, on every vote and at proposal creation
//!
//! Implementations must keep `add` commutative and associative so that
//! revealed tallies do not depend on the order votes arrived in.

use std::sync::Arc;

use crate::{Ciphertext, Result};

/// Arithmetic on encrypted counters
pub trait EncryptedTallyEffects: Send + Sync {
    /// Encryption of 0
    fn zero(&self) -> Ciphertext;

    /// Encryption of `a + b`
    fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext>;

    /// Encryption of `1 - v`
    fn complement(&self, vote: &Ciphertext) -> Result<Ciphertext>;

    /// Verify a submitted ballot and return its tally-form ciphertext
    ///
    /// Fails with `InvalidArgument` if the ballot is malformed or its proof
    /// does not show that the plaintext is 0 or 1.
    fn validate(&self, ballot: &Ciphertext) -> Result<Ciphertext>;
}

impl<T: EncryptedTallyEffects + ?Sized> EncryptedTallyEffects for Arc<T> {
    fn zero(&self) -> Ciphertext {
        (**self).zero()
    }

    fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        (**self).add(a, b)
    }

    fn complement(&self, vote: &Ciphertext) -> Result<Ciphertext> {
        (**self).complement(vote)
    }

    fn validate(&self, ballot: &Ciphertext) -> Result<Ciphertext> {
        (**self).validate(ballot)
    }
}
