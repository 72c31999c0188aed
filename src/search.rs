//! The key-recovery search over late-round key candidates.
//!
//! The engine enumerates tweak-normalised guesses for `(rk10, L^-1(rk9))`,
//! peels the last two rounds of every chosen-plaintext pair, and keeps a
//! guess only if the three lanes of feasible round-8 S-box outputs have a
//! non-empty intersection across all pairs. Survivors are expanded into
//! concrete `rk8` candidates, which must in turn put the round-6 output
//! difference back into a single active byte; each pair then pins the MSB
//! lane of `L^-1(rk7)` down to a small DDT-derived set.
//!
//! Iterations of the outer loop are pure and share only read-only tables,
//! so the sweep fans out over rayon workers; per-worker candidate lists
//! and counters are merged at the join. Output order is not meaningful and
//! callers must treat the candidate list as a set.

use std::fmt;

use rayon::prelude::*;

use crate::byteset::ByteSet;
use crate::cipher::{
    inv_round_no_mc, inv_round_with_mc, inv_round_with_mc_inv_key, key_schedule,
    normalize_round_key, normalize_round_key_10,
};
use crate::differential::{DdtTables, PairTables};
use crate::error::Error;
use crate::linear::{inv_linear_layer, linear_layer};
use crate::pairs::{validate_pairs, Pair};

/// Bounds and switches for one search run.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Enumerate `rk10` guesses in `0..max_rk10`. The full attack uses
    /// `1 << 24`; the default keeps a demo run tractable.
    pub max_rk10: u64,
    /// Enumerate `L^-1(rk9)` guesses in `0..max_rk9`.
    pub max_rk9: u64,
    /// Fan the outer loop out over rayon workers.
    pub parallel: bool,
    /// Collect filter statistics. Costs a few percent in the hot loop.
    pub counters: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            max_rk10: 0x10000,
            max_rk9: 0x10000,
            parallel: true,
            counters: false,
        }
    }
}

impl SearchParams {
    pub fn validate(&self) -> Result<(), Error> {
        for bound in [self.max_rk10, self.max_rk9] {
            if bound > 1 << 24 {
                return Err(Error::BoundTooLarge { bound });
            }
        }
        Ok(())
    }
}

/// A recovered tuple of late-round key material, in tweak-normalised form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// MSB lane of `L^-1(rk7)`.
    pub l_inv_rk7_0: u8,
    pub rk8: u32,
    pub rk9: u32,
    pub rk10: u32,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Candidate: L_inv_rk7_0 = 0x{:x}, rk8 = 0x{:x}, rk9 = 0x{:x}, rk10 = 0x{:x}",
            self.l_inv_rk7_0, self.rk8, self.rk9, self.rk10
        )
    }
}

/// Filter statistics, accumulated per worker and summed at the join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Sizes of the per-lane feasible sets, summed over guesses and pairs.
    pub rk8_lane: [u64; 3],
    /// Guesses whose three-lane intersection stayed non-empty.
    pub survived_rk8: u64,
    /// Per-pair passes of the two-byte zero check on the round-6 output
    /// difference.
    pub survived_dy6: u64,
    /// Emitted candidates.
    pub survived_rk7: u64,
}

impl Counters {
    fn merge(mut self, other: Self) -> Self {
        for j in 0..3 {
            self.rk8_lane[j] += other.rk8_lane[j];
        }
        self.survived_rk8 += other.survived_rk8;
        self.survived_dy6 += other.survived_dy6;
        self.survived_rk7 += other.survived_rk7;
        self
    }
}

/// Everything one search run produces.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub candidates: Vec<Candidate>,
    pub counters: Counters,
}

impl SearchOutcome {
    fn merge(mut self, other: Self) -> Self {
        self.candidates.extend(other.candidates);
        self.counters = self.counters.merge(other.counters);
        self
    }
}

/// A single normalised `(rk10, L^-1(rk9))` guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guess {
    pub rk10_norm: u32,
    pub l_inv_rk9_norm: u32,
}

impl Guess {
    /// The guess that corresponds to the true master key, i.e. the real
    /// round keys of pair 0 in normalised form. Used to verify that the
    /// engine recovers a key it is handed.
    pub fn from_master_key(key: u128, pairs: &[Pair]) -> Result<Self, Error> {
        let anchor = pairs.first().ok_or(Error::NoPairs)?;
        let rk = key_schedule(key, 0);
        let l_inv_rk9_norm = inv_linear_layer(normalize_round_key(rk[9], anchor.tweak, 9));
        let rk10_norm =
            normalize_round_key_10(rk[10], linear_layer(l_inv_rk9_norm) as u8, anchor.tweak);
        Ok(Guess {
            rk10_norm,
            l_inv_rk9_norm,
        })
    }
}

/// Per-worker scratch, sized once so the per-guess body never allocates.
struct Scratch {
    l_inv_rk9: Vec<u32>,
    rk10: Vec<u32>,
    rk10_prime: Vec<u32>,
    x8: Vec<u32>,
    x8_prime: Vec<u32>,
    dz7: Vec<u32>,
    v8: Vec<[u8; 3]>,
}

impl Scratch {
    fn new(n_pairs: usize) -> Self {
        Scratch {
            l_inv_rk9: vec![0; n_pairs],
            rk10: vec![0; n_pairs],
            rk10_prime: vec![0; n_pairs],
            x8: vec![0; n_pairs],
            x8_prime: vec![0; n_pairs],
            dz7: vec![0; n_pairs],
            v8: vec![[0; 3]; n_pairs],
        }
    }
}

/// The search engine. Borrows the pair data and the precomputed tables;
/// everything it holds is read-only during a run.
pub struct KeySearch<'a> {
    pairs: &'a [Pair],
    ddt: &'a DdtTables,
    tables: &'a PairTables,
    /// `L^-1(N_8(t_i))` split into lanes, per pair.
    norm8: Vec<[u8; 3]>,
    /// MSB lane of `L^-1(N_7(t_i))`, per pair.
    norm7_msb: Vec<u8>,
    /// `L^-1(N_9(t_0 ^ t_i))`, per pair (zero for the anchor pair).
    norm9_rel: Vec<u32>,
}

impl<'a> KeySearch<'a> {
    pub fn new(
        pairs: &'a [Pair],
        ddt: &'a DdtTables,
        tables: &'a PairTables,
    ) -> Result<Self, Error> {
        validate_pairs(pairs)?;
        let norm8 = pairs
            .iter()
            .map(|p| {
                let n = inv_linear_layer(normalize_round_key(0, p.tweak, 8));
                [(n >> 16) as u8, (n >> 8) as u8, n as u8]
            })
            .collect();
        let norm7_msb = pairs
            .iter()
            .map(|p| (inv_linear_layer(normalize_round_key(0, p.tweak, 7)) >> 16) as u8)
            .collect();
        let anchor_tweak = pairs[0].tweak;
        let norm9_rel = pairs
            .iter()
            .map(|p| inv_linear_layer(normalize_round_key(0, anchor_tweak ^ p.tweak, 9)))
            .collect();
        Ok(KeySearch {
            pairs,
            ddt,
            tables,
            norm8,
            norm7_msb,
            norm9_rel,
        })
    }

    /// Sweep the whole `(rk10, rk9)` rectangle.
    pub fn run(&self, params: &SearchParams) -> Result<SearchOutcome, Error> {
        self.run_with_probe(params, None)
    }

    /// Like [`run`](Self::run), but evaluates `probe` before the sweep.
    /// With the probe from [`Guess::from_master_key`] this checks that the
    /// engine emits the true key material.
    pub fn run_with_probe(
        &self,
        params: &SearchParams,
        probe: Option<Guess>,
    ) -> Result<SearchOutcome, Error> {
        params.validate()?;

        let mut outcome = SearchOutcome::default();
        if let Some(guess) = probe {
            let mut scratch = Scratch::new(self.pairs.len());
            self.process(
                guess.rk10_norm,
                guess.l_inv_rk9_norm,
                params.counters,
                &mut scratch,
                &mut outcome,
            );
        }

        let swept = if params.parallel {
            (0..params.max_rk10 as u32)
                .into_par_iter()
                .map(|rk10_norm| self.scan_rk10(rk10_norm, params))
                .reduce(SearchOutcome::default, SearchOutcome::merge)
        } else {
            (0..params.max_rk10 as u32)
                .map(|rk10_norm| self.scan_rk10(rk10_norm, params))
                .fold(SearchOutcome::default(), SearchOutcome::merge)
        };
        Ok(outcome.merge(swept))
    }

    fn scan_rk10(&self, rk10_norm: u32, params: &SearchParams) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        let mut scratch = Scratch::new(self.pairs.len());
        for l_inv_rk9_norm in 0..params.max_rk9 as u32 {
            self.process(
                rk10_norm,
                l_inv_rk9_norm,
                params.counters,
                &mut scratch,
                &mut outcome,
            );
        }
        outcome
    }

    /// Evaluate one normalised guess.
    fn process(
        &self,
        rk10_norm: u32,
        l_inv_rk9_norm: u32,
        counters_on: bool,
        s: &mut Scratch,
        out: &mut SearchOutcome,
    ) {
        let pairs = self.pairs;
        let n = pairs.len();

        // The guessed values play the role of pair 0's real round keys;
        // other pairs differ from them by normalisation constants only.
        let rk9_anchor = linear_layer(l_inv_rk9_norm);
        let rk10_base = normalize_round_key_10(rk10_norm, rk9_anchor as u8, pairs[0].tweak);
        s.l_inv_rk9[0] = l_inv_rk9_norm;
        s.rk10[0] = rk10_norm;
        s.rk10_prime[0] = rk10_norm ^ ((pairs[0].delta as u32) << 16);
        for i in 1..n {
            s.l_inv_rk9[i] = l_inv_rk9_norm ^ self.norm9_rel[i];
            s.rk10[i] = normalize_round_key_10(
                rk10_base,
                linear_layer(s.l_inv_rk9[i]) as u8,
                pairs[i].tweak,
            );
            s.rk10_prime[i] = s.rk10[i] ^ ((pairs[i].delta as u32) << 16);
        }

        // Peel rounds 10 and 9; reconstruct delta_z7 and the key-free
        // round-8 view v8 = L^-1(x8).
        for i in 0..n {
            let x8 = inv_round_with_mc_inv_key(inv_round_no_mc(pairs[i].ct, s.rk10[i]), s.l_inv_rk9[i]);
            let x8_prime = inv_round_with_mc_inv_key(
                inv_round_no_mc(pairs[i].ct_prime, s.rk10_prime[i]),
                s.l_inv_rk9[i],
            );
            s.x8[i] = x8;
            s.x8_prime[i] = x8_prime;
            s.dz7[i] = x8 ^ x8_prime ^ pairs[i].delta as u32;
            let v8 = inv_linear_layer(x8);
            s.v8[i] = [(v8 >> 16) as u8, (v8 >> 8) as u8, v8 as u8];
        }

        // Principal filter: per lane, the feasible round-8 S-box outputs
        // of all pairs must intersect once shifted into pair 0's frame.
        let mut intersection = [ByteSet::empty(); 3];
        for j in 0..3 {
            let mut acc = self.tables.lanes(0, s.dz7[0])[j];
            if counters_on {
                out.counters.rk8_lane[j] += acc.len() as u64;
            }
            for i in 1..n {
                let lane = self.tables.lanes(i, s.dz7[i])[j];
                if counters_on {
                    out.counters.rk8_lane[j] += lane.len() as u64;
                }
                let frame = s.v8[0][j] ^ self.norm8[0][j] ^ s.v8[i][j] ^ self.norm8[i][j];
                acc = acc.intersect(lane.shift(frame));
            }
            if !counters_on && acc.is_empty() {
                return;
            }
            intersection[j] = acc;
        }
        if intersection.iter().any(ByteSet::is_empty) {
            return;
        }
        if counters_on {
            out.counters.survived_rk8 += 1;
        }

        // Materialise rk8 candidates lane by lane and push each through
        // one more round: the round-6 output difference must have its two
        // low lanes equal across the pair, and the MSB lane then pins
        // L^-1(rk7)_0 through the DDT.
        for b0 in intersection[0].iter() {
            let rk8_0 = b0 ^ s.v8[0][0] ^ self.norm8[0][0];
            for b1 in intersection[1].iter() {
                let rk8_1 = b1 ^ s.v8[0][1] ^ self.norm8[0][1];
                'rk8: for b2 in intersection[2].iter() {
                    let rk8_2 = b2 ^ s.v8[0][2] ^ self.norm8[0][2];
                    let rk8 =
                        linear_layer(((rk8_0 as u32) << 16) ^ ((rk8_1 as u32) << 8) ^ rk8_2 as u32);

                    let mut survivors = ByteSet::full();
                    for i in 0..n {
                        let rk8_real = normalize_round_key(rk8, pairs[i].tweak, 8);
                        let rk8_real_prime = rk8_real ^ pairs[i].delta as u32;
                        let v7 = inv_linear_layer(inv_round_with_mc(s.x8[i], rk8_real));
                        let v7_prime = inv_linear_layer(
                            inv_round_with_mc(s.x8_prime[i], rk8_real_prime)
                                ^ ((pairs[i].delta as u32) << 8),
                        );
                        if (v7 ^ v7_prime) & 0x00FFFF != 0 {
                            continue 'rk8;
                        }
                        if counters_on {
                            out.counters.survived_dy6 += 1;
                        }
                        let delta_v7_0 = ((v7 ^ v7_prime) >> 16) as u8;
                        let v7_0 = (v7 >> 16) as u8;
                        survivors = survivors.intersect(self.ddt.shifted(
                            pairs[i].delta,
                            delta_v7_0,
                            v7_0 ^ self.norm7_msb[i],
                        ));
                    }

                    if survivors.is_empty() {
                        continue;
                    }
                    let rk9 = normalize_round_key(rk9_anchor, pairs[0].tweak, 9);
                    for byte in survivors.iter() {
                        if counters_on {
                            out.counters.survived_rk7 += 1;
                        }
                        out.candidates.push(Candidate {
                            l_inv_rk7_0: byte,
                            rk8,
                            rk9,
                            rk10: rk10_base,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{encrypt, round_with_mc};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_key(rng: &mut StdRng) -> u128 {
        ((rng.gen::<u64>() as u128) << 64) | rng.gen::<u64>() as u128
    }

    /// Encryption states entering each round, for checking the peel.
    fn round_inputs(plaintext: u32, key: u128, tweak: u64) -> [u32; 11] {
        let rk = key_schedule(key, tweak);
        let mut states = [0u32; 11];
        states[1] = plaintext ^ rk[0];
        for r in 1..10 {
            states[r + 1] = round_with_mc(states[r], rk[r]);
        }
        states
    }

    #[test]
    fn normalisation_matches_key_schedule_for_peeled_rounds() {
        let mut rng = StdRng::seed_from_u64(0xA1);
        for _ in 0..100 {
            let key = random_key(&mut rng);
            let tweak = rng.gen::<u64>();
            let rk0 = key_schedule(key, 0);
            let rkt = key_schedule(key, tweak);
            for round in [7, 8, 9] {
                assert_eq!(
                    normalize_round_key(rk0[round], tweak, round),
                    rkt[round],
                    "round {round}"
                );
                assert_eq!(normalize_round_key(rkt[round], tweak, round), rk0[round]);
            }
            assert_eq!(normalize_round_key_10(rk0[10], rkt[9] as u8, tweak), rkt[10]);
            // either round-9 byte gives the same result
            assert_eq!(normalize_round_key_10(rk0[10], rk0[9] as u8, tweak), rkt[10]);
        }
    }

    #[test]
    fn normalisation_is_an_involution() {
        let mut rng = StdRng::seed_from_u64(0xA2);
        for _ in 0..100 {
            let rk = rng.gen::<u32>() & 0xFF_FFFF;
            let tweak = rng.gen::<u64>();
            for round in 0..=10 {
                assert_eq!(
                    normalize_round_key(normalize_round_key(rk, tweak, round), tweak, round),
                    rk,
                    "round {round}"
                );
            }
            let lb9 = rng.gen::<u8>();
            assert_eq!(
                normalize_round_key_10(normalize_round_key_10(rk, lb9, tweak), lb9, tweak),
                rk
            );
        }
    }

    #[test]
    fn probe_denormalises_to_every_pairs_true_keys() {
        let mut rng = StdRng::seed_from_u64(0xA3);
        for _ in 0..20 {
            let key = random_key(&mut rng);
            let pairs: Vec<Pair> = (0..3)
                .map(|i| {
                    Pair::query(
                        key,
                        rng.gen::<u32>() & 0xFF_FFFF,
                        rng.gen::<u64>(),
                        (i + 1) as u8 * 17,
                    )
                })
                .collect();
            let probe = Guess::from_master_key(key, &pairs).unwrap();

            // the guessed values are pair 0's real keys
            let rkt0 = key_schedule(key, pairs[0].tweak);
            assert_eq!(linear_layer(probe.l_inv_rk9_norm), rkt0[9]);
            assert_eq!(probe.rk10_norm, rkt0[10]);

            // and the per-pair shifts reproduce every other pair's keys
            let rk10_base = normalize_round_key_10(
                probe.rk10_norm,
                linear_layer(probe.l_inv_rk9_norm) as u8,
                pairs[0].tweak,
            );
            for p in &pairs[1..] {
                let rkt = key_schedule(key, p.tweak);
                let l_inv_rk9 = probe.l_inv_rk9_norm
                    ^ inv_linear_layer(normalize_round_key(0, pairs[0].tweak ^ p.tweak, 9));
                assert_eq!(linear_layer(l_inv_rk9), rkt[9]);
                let rk10 =
                    normalize_round_key_10(rk10_base, linear_layer(l_inv_rk9) as u8, p.tweak);
                assert_eq!(rk10, rkt[10]);
            }
        }
    }

    #[test]
    fn peeling_with_true_keys_recovers_the_round_8_state() {
        let mut rng = StdRng::seed_from_u64(0xA4);
        for _ in 0..20 {
            let key = random_key(&mut rng);
            let plaintext = rng.gen::<u32>() & 0xFF_FFFF;
            let tweak = rng.gen::<u64>();
            let delta = 0x4D;
            let pair = Pair::query(key, plaintext, tweak, delta);

            let rkt = key_schedule(key, tweak);
            let x8 = inv_round_with_mc_inv_key(
                inv_round_no_mc(pair.ct, rkt[10]),
                inv_linear_layer(rkt[9]),
            );
            assert_eq!(x8, round_inputs(plaintext, key, tweak)[9]);

            // the primed ciphertext peels with rk10 ^ (delta << 16) and the
            // same round-9 key
            let tweak_prime = tweak ^ ((delta as u64) << 40);
            let rkt_prime = key_schedule(key, tweak_prime);
            assert_eq!(rkt_prime[10], rkt[10] ^ ((delta as u32) << 16));
            assert_eq!(rkt_prime[9], rkt[9]);
            let x8_prime = inv_round_with_mc_inv_key(
                inv_round_no_mc(pair.ct_prime, rkt_prime[10]),
                inv_linear_layer(rkt[9]),
            );
            assert_eq!(
                x8_prime,
                round_inputs(plaintext ^ delta as u32, key, tweak_prime)[9]
            );
        }
    }

    #[test]
    fn dy6_filter_accepts_the_true_rk8_and_pins_l_inv_rk7() {
        let ddt = DdtTables::build();
        let mut rng = StdRng::seed_from_u64(0xA5);
        for _ in 0..20 {
            let key = random_key(&mut rng);
            let plaintext = rng.gen::<u32>() & 0xFF_FFFF;
            let tweak = rng.gen::<u64>();
            let delta = rng.gen_range(1..=255u8);
            let pair = Pair::query(key, plaintext, tweak, delta);

            let rk0 = key_schedule(key, 0);
            let rkt = key_schedule(key, tweak);
            let tweak_prime = tweak ^ ((delta as u64) << 40);
            let rkt_prime = key_schedule(key, tweak_prime);

            let x8 = inv_round_with_mc_inv_key(
                inv_round_no_mc(pair.ct, rkt[10]),
                inv_linear_layer(rkt[9]),
            );
            let x8_prime = inv_round_with_mc_inv_key(
                inv_round_no_mc(pair.ct_prime, rkt_prime[10]),
                inv_linear_layer(rkt_prime[9]),
            );

            // rk8 differs between the two tweaks by exactly delta
            assert_eq!(rkt_prime[8], rkt[8] ^ delta as u32);

            let v7 = inv_linear_layer(inv_round_with_mc(x8, rkt[8]));
            let v7_prime = inv_linear_layer(
                inv_round_with_mc(x8_prime, rkt_prime[8]) ^ ((delta as u32) << 8),
            );
            assert_eq!((v7 ^ v7_prime) & 0x00FFFF, 0, "low lanes must cancel");

            let delta_v7_0 = ((v7 ^ v7_prime) >> 16) as u8;
            let v7_0 = (v7 >> 16) as u8;
            let norm7_msb = (inv_linear_layer(normalize_round_key(0, tweak, 7)) >> 16) as u8;
            let survivors = ddt.shifted(delta, delta_v7_0, v7_0 ^ norm7_msb);
            let expected = (inv_linear_layer(rk0[7]) >> 16) as u8;
            assert!(survivors.contains(expected));
        }
    }

    #[test]
    fn probe_requires_at_least_one_pair() {
        assert!(matches!(
            Guess::from_master_key(0, &[]),
            Err(Error::NoPairs)
        ));
    }

    #[test]
    fn params_reject_bounds_above_the_key_space() {
        let params = SearchParams {
            max_rk10: (1 << 24) + 1,
            ..SearchParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(Error::BoundTooLarge { .. })
        ));
        assert!(SearchParams::default().validate().is_ok());
    }

    #[test]
    fn candidate_display_format() {
        let c = Candidate {
            l_inv_rk7_0: 0x5,
            rk8: 0xabcdef,
            rk9: 0x123456,
            rk10: 0xf0e1d2,
        };
        assert_eq!(
            c.to_string(),
            "Candidate: L_inv_rk7_0 = 0x5, rk8 = 0xabcdef, rk9 = 0x123456, rk10 = 0xf0e1d2"
        );
    }

    #[test]
    fn counters_merge_componentwise() {
        let a = Counters {
            rk8_lane: [1, 2, 3],
            survived_rk8: 4,
            survived_dy6: 5,
            survived_rk7: 6,
        };
        let b = Counters {
            rk8_lane: [10, 20, 30],
            survived_rk8: 40,
            survived_dy6: 50,
            survived_rk7: 60,
        };
        assert_eq!(
            a.merge(b),
            Counters {
                rk8_lane: [11, 22, 33],
                survived_rk8: 44,
                survived_dy6: 55,
                survived_rk7: 66,
            }
        );
    }

    // sanity: the chosen tweak difference leaves rk9 untouched, which is
    // what lets one L^-1(rk9) guess serve both ciphertexts of a pair
    #[test]
    fn tweak_difference_cancels_in_round_9() {
        let mut rng = StdRng::seed_from_u64(0xA6);
        for _ in 0..50 {
            let key = random_key(&mut rng);
            let tweak = rng.gen::<u64>();
            let delta = rng.gen_range(1..=255u8);
            let rkt = key_schedule(key, tweak);
            let rkt_prime = key_schedule(key, tweak ^ ((delta as u64) << 40));
            assert_eq!(rkt[9], rkt_prime[9]);
            assert_eq!(rkt_prime[10], rkt[10] ^ ((delta as u32) << 16));
        }
    }

    #[test]
    fn encryption_vector_guards_the_peel() {
        // the peel identities above only mean something if encrypt itself
        // is right
        assert_eq!(
            encrypt(0x010203, 0x2b7e151628aed2a6_abf7158809cf4f3c, 0x543bd88000017550),
            0xf28c1e
        );
    }
}
