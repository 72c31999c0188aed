//! Chosen-plaintext / chosen-tweak data for the attack.
//!
//! Each pair fixes a random plaintext, a random tweak and a one-byte input
//! difference `delta`, and records the encryptions of `(p, t)` and of
//! `(p ^ delta, t ^ (delta << 40))`. The tweak difference cancels the
//! plaintext difference in the round-0 key, which is what confines the
//! trail to a single active byte. Differences must be non-zero and
//! pairwise distinct across pairs.

use rand::RngCore;

use crate::cipher::encrypt;
use crate::error::Error;

/// One chosen-plaintext query pair under an unknown master key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub plaintext: u32,
    pub tweak: u64,
    /// One-byte input difference, non-zero.
    pub delta: u8,
    /// `E(plaintext, key, tweak)`.
    pub ct: u32,
    /// `E(plaintext ^ delta, key, tweak ^ (delta << 40))`.
    pub ct_prime: u32,
}

impl Pair {
    /// Run the two oracle queries for the given inputs.
    pub fn query(key: u128, plaintext: u32, tweak: u64, delta: u8) -> Self {
        Pair {
            plaintext,
            tweak,
            delta,
            ct: encrypt(plaintext, key, tweak),
            ct_prime: encrypt(plaintext ^ delta as u32, key, tweak ^ ((delta as u64) << 40)),
        }
    }
}

/// Sample `n_pairs` pairs with fresh plaintexts, tweaks and differences.
///
/// Differences are rejection-sampled until non-zero and distinct from all
/// earlier pairs. Entropy failures surface as [`Error::Entropy`].
pub fn generate_pairs<R: RngCore>(rng: &mut R, key: u128, n_pairs: usize) -> Result<Vec<Pair>, Error> {
    if n_pairs == 0 {
        return Err(Error::NoPairs);
    }
    if n_pairs > 255 {
        return Err(Error::TooManyPairs(n_pairs));
    }

    let mut pairs = Vec::with_capacity(n_pairs);
    for _ in 0..n_pairs {
        let mut tweak_bytes = [0u8; 8];
        rng.try_fill_bytes(&mut tweak_bytes)?;
        let tweak = u64::from_le_bytes(tweak_bytes);

        let mut plain_bytes = [0u8; 4];
        rng.try_fill_bytes(&mut plain_bytes[..3])?;
        let plaintext = u32::from_le_bytes(plain_bytes);

        let delta = loop {
            let mut d = [0u8; 1];
            rng.try_fill_bytes(&mut d)?;
            if d[0] != 0 && pairs.iter().all(|p: &Pair| p.delta != d[0]) {
                break d[0];
            }
        };

        pairs.push(Pair::query(key, plaintext, tweak, delta));
    }
    Ok(pairs)
}

/// Check the invariants the search relies on: at least one pair, non-zero
/// differences, pairwise distinct differences.
pub fn validate_pairs(pairs: &[Pair]) -> Result<(), Error> {
    if pairs.is_empty() {
        return Err(Error::NoPairs);
    }
    for (i, p) in pairs.iter().enumerate() {
        if p.delta == 0 {
            return Err(Error::ZeroDifference { pair: i });
        }
        if pairs[..i].iter().any(|q| q.delta == p.delta) {
            return Err(Error::DuplicateDifference { delta: p.delta });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const KEY: u128 = 0x000102030405060708090a0b0c0d0e0f;

    #[test]
    fn generated_pairs_are_valid_and_consistent() {
        let mut rng = StdRng::seed_from_u64(42);
        let pairs = generate_pairs(&mut rng, KEY, 5).unwrap();
        assert_eq!(pairs.len(), 5);
        validate_pairs(&pairs).unwrap();
        for p in &pairs {
            assert!(p.plaintext < 1 << 24);
            assert_eq!(p.ct, encrypt(p.plaintext, KEY, p.tweak));
            assert_eq!(
                p.ct_prime,
                encrypt(p.plaintext ^ p.delta as u32, KEY, p.tweak ^ ((p.delta as u64) << 40))
            );
        }
    }

    #[test]
    fn zero_pairs_is_a_configuration_error() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(generate_pairs(&mut rng, KEY, 0), Err(Error::NoPairs)));
    }

    #[test]
    fn more_pairs_than_differences_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            generate_pairs(&mut rng, KEY, 300),
            Err(Error::TooManyPairs(300))
        ));
    }

    #[test]
    fn validate_rejects_zero_difference() {
        let pairs = [Pair::query(KEY, 0x123456, 77, 0)];
        assert!(matches!(
            validate_pairs(&pairs),
            Err(Error::ZeroDifference { pair: 0 })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_differences() {
        let pairs = [
            Pair::query(KEY, 0x123456, 77, 0x13),
            Pair::query(KEY, 0x654321, 78, 0x13),
        ];
        assert!(matches!(
            validate_pairs(&pairs),
            Err(Error::DuplicateDifference { delta: 0x13 })
        ));
    }

    #[test]
    fn all_255_differences_can_be_drawn() {
        let mut rng = StdRng::seed_from_u64(9);
        let pairs = generate_pairs(&mut rng, KEY, 255).unwrap();
        validate_pairs(&pairs).unwrap();
    }
}
