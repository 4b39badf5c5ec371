//! Revealed tallies do not depend on the order votes are folded in

use ballot_core::effects::{DecryptionEffects, EncryptedTallyEffects, VoteEncryptionEffects};
use ballot_core::Ciphertext;
use ballot_effects::{ElGamalTallyHandler, TallyKeyPair};
use proptest::prelude::*;

fn fold(tally: &ElGamalTallyHandler, votes: &[Ciphertext]) -> (Ciphertext, Ciphertext) {
    let mut yes = tally.zero();
    let mut no = tally.zero();
    for ballot in votes {
        let v = tally.validate(ballot).unwrap();
        yes = tally.add(&yes, &v).unwrap();
        no = tally.add(&no, &tally.complement(&v).unwrap()).unwrap();
    }
    (yes, no)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn any_permutation_reveals_the_same_counts(
        choices in prop::collection::vec(any::<bool>(), 0..12),
        rotate in 0usize..12,
    ) {
        let keys = TallyKeyPair::from_seed([42u8; 32]);
        let tally = keys.tally_handler();
        let enc = keys.encryptor();
        let votes: Vec<Ciphertext> = choices
            .iter()
            .map(|&c| enc.encrypt_vote(c).unwrap())
            .collect();

        let mut reordered = votes.clone();
        reordered.reverse();
        if !reordered.is_empty() {
            let k = rotate % reordered.len();
            reordered.rotate_left(k);
        }

        let (yes_a, no_a) = fold(&tally, &votes);
        let (yes_b, no_b) = fold(&tally, &reordered);

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let oracle = keys.oracle();
        let expected_yes = choices.iter().filter(|c| **c).count() as u32;
        let expected_no = choices.len() as u32 - expected_yes;

        let (ya, na, yb, nb) = rt.block_on(async {
            (
                oracle.decrypt_tally(&yes_a).await.unwrap(),
                oracle.decrypt_tally(&no_a).await.unwrap(),
                oracle.decrypt_tally(&yes_b).await.unwrap(),
                oracle.decrypt_tally(&no_b).await.unwrap(),
            )
        });
        prop_assert_eq!(ya, expected_yes);
        prop_assert_eq!(na, expected_no);
        prop_assert_eq!(yb, ya);
        prop_assert_eq!(nb, na);
        // Sums are the same group elements regardless of order.
        prop_assert_eq!(yes_a, yes_b);
    }
}
