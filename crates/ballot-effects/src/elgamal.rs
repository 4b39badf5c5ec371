//! Exponential ElGamal over the Ristretto group
//!
//! A count `m` is encrypted as `(r·G, m·G + r·H)` where `H = x·G` is the tally
//! public key. Component-wise point addition adds the plaintexts, which is all
//! the ledger needs to fold votes into running tallies. Decryption recovers
//! `m·G` and then `m` by a baby-step giant-step search, so only counts below
//! [`MAX_DECODABLE_TALLY`] are recoverable.
//!
//! Wire layouts:
//!
//! - tally: `compress(c1) || compress(c2)`, [`CIPHERTEXT_LEN`] bytes
//! - ballot: a tally-form ciphertext followed by a disjunctive Chaum-Pedersen
//!   proof `e0 || e1 || z0 || z1` that it encrypts 0 or 1, [`BALLOT_LEN`] bytes
//!
//! The proof is made non-interactive with a `blake3` Fiat-Shamir challenge.
//! Ballots without a valid proof never reach the tallies, so no voter can add
//! more than one to either count.
//!
//! Three handlers share one [`TallyKeyPair`]:
//!
//! - [`ElGamalTallyHandler`]: public arithmetic, given to the ledger
//! - [`ElGamalVoteEncryptor`]: public encryption, given to clients
//! - [`ElGamalOracleHandler`]: secret decryption, given to the node

use async_trait::async_trait;
use ballot_core::effects::{DecryptionEffects, EncryptedTallyEffects, VoteEncryptionEffects};
use ballot_core::{Ciphertext, Result, VotingError};
use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT as G;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use once_cell::sync::Lazy;
use rand::RngCore;
use std::collections::HashMap;
use std::fmt;

/// Encoded ciphertext length
pub const CIPHERTEXT_LEN: usize = 64;

/// Encoded length of the 0-or-1 proof attached to a ballot
pub const PROOF_LEN: usize = 128;

/// Encoded ballot length
pub const BALLOT_LEN: usize = CIPHERTEXT_LEN + PROOF_LEN;

/// Exclusive upper bound on tallies the oracle can decode
pub const MAX_DECODABLE_TALLY: u32 = 1 << 24;

const PROOF_CONTEXT: &str = "ballot-effects 2024-06-01 binary vote proof";

const BABY_STEPS: u32 = 1 << 10;

static BABY_TABLE: Lazy<HashMap<[u8; 32], u32>> = Lazy::new(|| {
    let mut table = HashMap::with_capacity(BABY_STEPS as usize);
    let mut acc = RistrettoPoint::identity();
    for j in 0..BABY_STEPS {
        table.insert(acc.compress().to_bytes(), j);
        acc += G;
    }
    table
});

fn random_scalar() -> Scalar {
    let mut wide = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut wide);
    Scalar::from_bytes_mod_order_wide(&wide)
}

fn decode_point(bytes: &[u8]) -> Result<RistrettoPoint> {
    let raw: [u8; 32] = bytes
        .try_into()
        .map_err(|_| VotingError::invalid_argument("ciphertext point must be 32 bytes"))?;
    CompressedRistretto(raw)
        .decompress()
        .ok_or_else(|| VotingError::invalid_argument("ciphertext point is not on the curve"))
}

fn decode_scalar(bytes: &[u8]) -> Result<Scalar> {
    let raw: [u8; 32] = bytes
        .try_into()
        .map_err(|_| VotingError::invalid_argument("proof scalar must be 32 bytes"))?;
    Option::<Scalar>::from(Scalar::from_canonical_bytes(raw))
        .ok_or_else(|| VotingError::invalid_argument("proof scalar is not canonical"))
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct Pair {
    c1: RistrettoPoint,
    c2: RistrettoPoint,
}

impl Pair {
    fn trivial(m: Scalar) -> Self {
        Self {
            c1: RistrettoPoint::identity(),
            c2: m * G,
        }
    }

    fn decode(ct: &Ciphertext) -> Result<Self> {
        Self::from_slice(ct.as_bytes())
    }

    fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != CIPHERTEXT_LEN {
            return Err(VotingError::invalid_argument(format!(
                "malformed ciphertext: expected {CIPHERTEXT_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self {
            c1: decode_point(&bytes[..32])?,
            c2: decode_point(&bytes[32..])?,
        })
    }

    fn to_bytes(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(BALLOT_LEN);
        bytes.extend_from_slice(self.c1.compress().as_bytes());
        bytes.extend_from_slice(self.c2.compress().as_bytes());
        bytes
    }

    fn encode(&self) -> Ciphertext {
        Ciphertext::from_bytes(self.to_bytes())
    }
}

type Commitment = (RistrettoPoint, RistrettoPoint);

/// Proof that `(c1, c2)` encrypts 0 or 1 under `public`
///
/// Branch `i` claims `log_G(c1) == log_H(c2 - i·G)`. The prover answers the
/// true branch and simulates the other; the two challenges must sum to the
/// Fiat-Shamir challenge.
#[derive(Clone, Copy)]
struct BinaryProof {
    challenges: [Scalar; 2],
    responses: [Scalar; 2],
}

fn commitment(public: &RistrettoPoint, ct: &Pair, branch: u32, e: Scalar, z: Scalar) -> Commitment {
    let shifted = ct.c2 - Scalar::from(branch) * G;
    (z * G - e * ct.c1, z * public - e * shifted)
}

fn fiat_shamir(public: &RistrettoPoint, ct: &Pair, commitments: &[Commitment; 2]) -> Scalar {
    let mut hasher = blake3::Hasher::new_derive_key(PROOF_CONTEXT);
    let [(a0, b0), (a1, b1)] = commitments;
    for point in [public, &ct.c1, &ct.c2, a0, b0, a1, b1] {
        hasher.update(point.compress().as_bytes());
    }
    let mut wide = [0u8; 64];
    hasher.finalize_xof().fill(&mut wide);
    Scalar::from_bytes_mod_order_wide(&wide)
}

impl BinaryProof {
    /// `m` must be 0 or 1 and `r` the encryption randomness
    fn prove(public: &RistrettoPoint, ct: &Pair, m: u32, r: Scalar) -> Self {
        let real = usize::from(m == 1);
        let simulated = 1 - real;
        let mut challenges = [Scalar::ZERO; 2];
        let mut responses = [Scalar::ZERO; 2];
        let mut commitments = [(RistrettoPoint::identity(), RistrettoPoint::identity()); 2];

        challenges[simulated] = random_scalar();
        responses[simulated] = random_scalar();
        commitments[simulated] = commitment(
            public,
            ct,
            simulated as u32,
            challenges[simulated],
            responses[simulated],
        );

        let w = random_scalar();
        commitments[real] = (w * G, w * public);
        let e = fiat_shamir(public, ct, &commitments);
        challenges[real] = e - challenges[simulated];
        responses[real] = w + challenges[real] * r;

        Self {
            challenges,
            responses,
        }
    }

    fn verify(&self, public: &RistrettoPoint, ct: &Pair) -> bool {
        let commitments = [
            commitment(public, ct, 0, self.challenges[0], self.responses[0]),
            commitment(public, ct, 1, self.challenges[1], self.responses[1]),
        ];
        self.challenges[0] + self.challenges[1] == fiat_shamir(public, ct, &commitments)
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        for scalar in self.challenges.iter().chain(&self.responses) {
            out.extend_from_slice(scalar.as_bytes());
        }
    }

    fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PROOF_LEN {
            return Err(VotingError::invalid_argument("malformed ballot proof"));
        }
        let scalar = |i: usize| decode_scalar(&bytes[i * 32..(i + 1) * 32]);
        Ok(Self {
            challenges: [scalar(0)?, scalar(1)?],
            responses: [scalar(2)?, scalar(3)?],
        })
    }
}

/// Recover `m` from `m·G` for `m < MAX_DECODABLE_TALLY`
fn discrete_log(target: RistrettoPoint) -> Option<u32> {
    let giant = -(Scalar::from(BABY_STEPS) * G);
    let mut gamma = target;
    for i in 0..(MAX_DECODABLE_TALLY / BABY_STEPS) {
        if let Some(j) = BABY_TABLE.get(&gamma.compress().to_bytes()) {
            return Some(i * BABY_STEPS + j);
        }
        gamma += giant;
    }
    None
}

/// Tally key material
#[derive(Clone)]
pub struct TallyKeyPair {
    secret: Scalar,
    public: RistrettoPoint,
}

impl TallyKeyPair {
    /// Fresh random key pair
    pub fn generate() -> Self {
        Self::from_secret(random_scalar())
    }

    /// Deterministic key pair from 32 seed bytes (reduced mod the group order)
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::from_secret(Scalar::from_bytes_mod_order(seed))
    }

    fn from_secret(secret: Scalar) -> Self {
        Self {
            secret,
            public: secret * G,
        }
    }

    /// Compressed public key
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.public.compress().to_bytes()
    }

    /// Public arithmetic and ballot verification handler
    pub fn tally_handler(&self) -> ElGamalTallyHandler {
        ElGamalTallyHandler {
            public: self.public,
        }
    }

    /// Public encryption handler
    pub fn encryptor(&self) -> ElGamalVoteEncryptor {
        ElGamalVoteEncryptor {
            public: self.public,
        }
    }

    /// Secret decryption handler
    pub fn oracle(&self) -> ElGamalOracleHandler {
        ElGamalOracleHandler {
            secret: self.secret,
        }
    }
}

impl fmt::Debug for TallyKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TallyKeyPair")
            .field("public", &self.public.compress())
            .finish_non_exhaustive()
    }
}

/// Homomorphic arithmetic and ballot verification under the public key
#[derive(Debug, Clone, Copy)]
pub struct ElGamalTallyHandler {
    public: RistrettoPoint,
}

impl EncryptedTallyEffects for ElGamalTallyHandler {
    fn zero(&self) -> Ciphertext {
        Pair::trivial(Scalar::ZERO).encode()
    }

    fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        let (a, b) = (Pair::decode(a)?, Pair::decode(b)?);
        Ok(Pair {
            c1: a.c1 + b.c1,
            c2: a.c2 + b.c2,
        }
        .encode())
    }

    fn complement(&self, vote: &Ciphertext) -> Result<Ciphertext> {
        let one = Pair::trivial(Scalar::ONE);
        let v = Pair::decode(vote)?;
        Ok(Pair {
            c1: one.c1 - v.c1,
            c2: one.c2 - v.c2,
        }
        .encode())
    }

    fn validate(&self, ballot: &Ciphertext) -> Result<Ciphertext> {
        let bytes = ballot.as_bytes();
        if bytes.len() != BALLOT_LEN {
            return Err(VotingError::invalid_argument(format!(
                "malformed ballot: expected {BALLOT_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let (ct_bytes, proof_bytes) = bytes.split_at(CIPHERTEXT_LEN);
        let pair = Pair::from_slice(ct_bytes)?;
        let proof = BinaryProof::from_slice(proof_bytes)?;
        if !proof.verify(&self.public, &pair) {
            return Err(VotingError::invalid_argument(
                "ballot proof does not show a 0 or 1 vote",
            ));
        }
        Ok(pair.encode())
    }
}

/// Encrypts votes under the tally public key
#[derive(Debug, Clone, Copy)]
pub struct ElGamalVoteEncryptor {
    public: RistrettoPoint,
}

impl ElGamalVoteEncryptor {
    /// Encryptor for a compressed public key
    pub fn from_public_key(bytes: [u8; 32]) -> Result<Self> {
        let public = CompressedRistretto(bytes)
            .decompress()
            .ok_or_else(|| VotingError::crypto("tally public key is not on the curve"))?;
        Ok(Self { public })
    }

    fn encrypt_ballot(&self, m: u32) -> Ciphertext {
        let r = random_scalar();
        let pair = Pair {
            c1: r * G,
            c2: Scalar::from(m) * G + r * self.public,
        };
        let proof = BinaryProof::prove(&self.public, &pair, m, r);
        let mut bytes = pair.to_bytes();
        proof.write_to(&mut bytes);
        Ciphertext::from_bytes(bytes)
    }
}

impl VoteEncryptionEffects for ElGamalVoteEncryptor {
    fn encrypt_vote(&self, support: bool) -> Result<Ciphertext> {
        Ok(self.encrypt_ballot(u32::from(support)))
    }
}

/// Holds the tally secret and decrypts on request
#[derive(Clone)]
pub struct ElGamalOracleHandler {
    secret: Scalar,
}

impl fmt::Debug for ElGamalOracleHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElGamalOracleHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl DecryptionEffects for ElGamalOracleHandler {
    async fn decrypt_tally(&self, tally: &Ciphertext) -> Result<u32> {
        let pair = Pair::decode(tally)
            .map_err(|e| VotingError::decryption_unavailable(format!("undecodable tally: {e}")))?;
        let plain = pair.c2 - self.secret * pair.c1;
        discrete_log(plain).ok_or_else(|| {
            VotingError::decryption_unavailable(format!(
                "tally outside decodable range [0, {MAX_DECODABLE_TALLY})"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn keys() -> TallyKeyPair {
        TallyKeyPair::from_seed([9u8; 32])
    }

    fn ballot_with(pair: Pair, proof: BinaryProof) -> Ciphertext {
        let mut bytes = pair.to_bytes();
        proof.write_to(&mut bytes);
        Ciphertext::from_bytes(bytes)
    }

    #[tokio::test]
    async fn zero_decrypts_to_zero() {
        let keys = keys();
        let zero = keys.tally_handler().zero();
        assert_eq!(keys.oracle().decrypt_tally(&zero).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn votes_and_complements_sum() {
        let keys = keys();
        let tally = keys.tally_handler();
        let enc = keys.encryptor();
        let mut yes = tally.zero();
        let mut no = tally.zero();
        for support in [true, false, true, true] {
            let v = tally.validate(&enc.encrypt_vote(support).unwrap()).unwrap();
            yes = tally.add(&yes, &v).unwrap();
            no = tally.add(&no, &tally.complement(&v).unwrap()).unwrap();
        }
        let oracle = keys.oracle();
        assert_eq!(oracle.decrypt_tally(&yes).await.unwrap(), 3);
        assert_eq!(oracle.decrypt_tally(&no).await.unwrap(), 1);
    }

    #[test]
    fn encryption_is_randomized() {
        let enc = keys().encryptor();
        let ballot = enc.encrypt_vote(true).unwrap();
        assert_eq!(ballot.len(), BALLOT_LEN);
        assert_ne!(ballot, enc.encrypt_vote(true).unwrap());
    }

    #[test]
    fn honest_ballots_verify_for_both_choices() {
        let keys = keys();
        let tally = keys.tally_handler();
        for support in [false, true] {
            let ballot = keys.encryptor().encrypt_vote(support).unwrap();
            let ct = tally.validate(&ballot).unwrap();
            assert_eq!(ct.as_bytes(), &ballot.as_bytes()[..CIPHERTEXT_LEN]);
        }
    }

    #[test]
    fn validate_rejects_bad_lengths_and_points() {
        let tally = keys().tally_handler();
        assert_matches!(
            tally.validate(&Ciphertext::from_bytes(vec![0u8; 10])),
            Err(VotingError::InvalidArgument { .. })
        );
        assert_matches!(
            tally.validate(&Ciphertext::from_bytes(vec![0xff; BALLOT_LEN])),
            Err(VotingError::InvalidArgument { .. })
        );
        // A bare tally has no proof.
        assert_matches!(
            tally.validate(&tally.zero()),
            Err(VotingError::InvalidArgument { .. })
        );
    }

    #[test]
    fn summed_ciphertext_cannot_reuse_a_proof() {
        let keys = keys();
        let tally = keys.tally_handler();
        let enc = keys.encryptor();
        let one = enc.encrypt_vote(true).unwrap();
        let two = tally
            .add(&tally.validate(&one).unwrap(), &tally.validate(&one).unwrap())
            .unwrap();

        let mut spliced = two.as_bytes().to_vec();
        spliced.extend_from_slice(&one.as_bytes()[CIPHERTEXT_LEN..]);
        assert_matches!(
            tally.validate(&Ciphertext::from_bytes(spliced)),
            Err(VotingError::InvalidArgument { .. })
        );
    }

    #[test]
    fn proof_with_a_false_witness_fails() {
        let keys = keys();
        let tally = keys.tally_handler();
        let r = random_scalar();
        let two = Pair {
            c1: r * G,
            c2: Scalar::from(2u32) * G + r * keys.public,
        };
        for claimed in [0, 1] {
            let proof = BinaryProof::prove(&keys.public, &two, claimed, r);
            assert!(!proof.verify(&keys.public, &two));
            assert_matches!(
                tally.validate(&ballot_with(two, proof)),
                Err(VotingError::InvalidArgument { .. })
            );
        }
    }

    #[test]
    fn tampered_or_foreign_proofs_fail() {
        let keys = keys();
        let tally = keys.tally_handler();
        let ballot = keys.encryptor().encrypt_vote(false).unwrap();

        let mut bytes = ballot.as_bytes().to_vec();
        bytes[CIPHERTEXT_LEN] ^= 1;
        assert_matches!(
            tally.validate(&Ciphertext::from_bytes(bytes)),
            Err(VotingError::InvalidArgument { .. })
        );

        let other = TallyKeyPair::from_seed([10u8; 32]).tally_handler();
        assert_matches!(
            other.validate(&ballot),
            Err(VotingError::InvalidArgument { .. })
        );
    }

    #[tokio::test]
    async fn large_tally_crosses_giant_steps() {
        let keys = keys();
        let pair = Pair {
            c1: RistrettoPoint::identity(),
            c2: Scalar::from(5_000u32) * G,
        };
        assert_eq!(
            keys.oracle().decrypt_tally(&pair.encode()).await.unwrap(),
            5_000
        );
    }

    #[tokio::test]
    async fn out_of_range_plaintext_is_unavailable() {
        let keys = keys();
        let pair = Pair {
            c1: RistrettoPoint::identity(),
            c2: -G,
        };
        assert_matches!(
            keys.oracle().decrypt_tally(&pair.encode()).await,
            Err(VotingError::DecryptionUnavailable { .. })
        );
    }

    #[tokio::test]
    async fn wrong_key_does_not_decrypt_to_the_plaintext() {
        let keys = keys();
        let ct = keys
            .tally_handler()
            .validate(&keys.encryptor().encrypt_vote(true).unwrap())
            .unwrap();
        let other = TallyKeyPair::from_seed([10u8; 32]);
        assert_ne!(other.oracle().decrypt_tally(&ct).await.ok(), Some(1));
    }

    #[test]
    fn encryptor_round_trips_public_key() {
        let keys = keys();
        assert!(ElGamalVoteEncryptor::from_public_key(keys.public_key_bytes()).is_ok());
    }
}
