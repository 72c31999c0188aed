//! Differential precomputation: the value-aware DDT and the per-pair
//! table of feasible S-box outputs.
//!
//! `DdtTables` records, for every transition `din -> dout`, not just the
//! count but the actual S-box output values realising it, both as a list
//! and as a [`ByteSet`]. Only the unshifted ByteSet is stored; a shifted
//! copy `{ y ^ c }` is one O(1) [`ByteSet::shift`] away, so materialising
//! all 2^8 shifts would buy nothing.
//!
//! `PairTables` is the big per-run structure: for each pair and each
//! guessed post-mixing difference `delta_z7`, the set of S-box output
//! bytes per lane that are consistent with the pair's one-byte input
//! difference and the linear layer. It is stored dense and flat because
//! the search reads it at fully random indices.

use rayon::prelude::*;

use crate::byteset::ByteSet;
use crate::cipher::SBOX;
use crate::linear::{l_from_msb, linear_layer};
use crate::pairs::Pair;

/// Value-aware difference distribution tables for the HALFLOOP-24 S-box.
pub struct DdtTables {
    /// `values[din][dout]`: the S-box outputs `S(x)` with
    /// `S(x) ^ S(x ^ din) = dout`.
    values: Vec<Vec<Vec<u8>>>,
    /// ByteSet form of `values`.
    sets: Vec<[ByteSet; 256]>,
    /// `possible[din]`: ascending list of reachable output differences.
    possible: Vec<Vec<u8>>,
}

impl DdtTables {
    pub fn build() -> Self {
        let mut values = vec![vec![Vec::new(); 256]; 256];
        for x in 0..256usize {
            for din in 0..256usize {
                let dout = (SBOX[x] ^ SBOX[x ^ din]) as usize;
                values[din][dout].push(SBOX[x]);
            }
        }

        let mut sets = vec![[ByteSet::empty(); 256]; 256];
        let mut possible = vec![Vec::new(); 256];
        for din in 0..256 {
            for dout in 0..256 {
                for &y in &values[din][dout] {
                    sets[din][dout].insert(y);
                }
                if !values[din][dout].is_empty() {
                    possible[din].push(dout as u8);
                }
            }
        }

        DdtTables {
            values,
            sets,
            possible,
        }
    }

    /// S-box outputs realising the transition `din -> dout`.
    #[inline]
    pub fn outputs(&self, din: u8, dout: u8) -> &[u8] {
        &self.values[din as usize][dout as usize]
    }

    /// The same outputs as a set.
    #[inline(always)]
    pub fn set(&self, din: u8, dout: u8) -> ByteSet {
        self.sets[din as usize][dout as usize]
    }

    /// `{ y ^ c : S(x) = y, S(x) ^ S(x ^ din) = dout }`.
    #[inline(always)]
    pub fn shifted(&self, din: u8, dout: u8, c: u8) -> ByteSet {
        self.set(din, dout).shift(c)
    }

    /// Output differences reachable from `din`, ascending.
    #[inline]
    pub fn possible_outputs(&self, din: u8) -> &[u8] {
        &self.possible[din as usize]
    }
}

/// Per-pair, per-`delta_z7`, per-lane sets of feasible S-box outputs.
///
/// Layout: one flat `Vec<ByteSet>` per pair, indexed by
/// `delta_z7 * 3 + lane`. Lookups are O(1); the table is read-only for the
/// whole search.
pub struct PairTables {
    per_pair: Vec<Vec<ByteSet>>,
}

impl PairTables {
    /// Build the tables for a set of pairs. Pairs are independent, so the
    /// build fans out over them.
    pub fn build(pairs: &[Pair], ddt: &DdtTables) -> Self {
        let per_pair = pairs
            .par_iter()
            .map(|pair| Self::build_one(pair.delta, ddt))
            .collect();
        PairTables { per_pair }
    }

    /// Table for a single one-byte input difference.
    ///
    /// For every reachable output difference `dout` of the penultimate
    /// active S-box, the difference entering round 7 is
    /// `L(dout << 16) ^ (delta << 8)`; every combination of per-lane output
    /// differences of round 7 then maps through `L` to one `delta_z7` slot,
    /// into which the realising S-box output values are unioned.
    fn build_one(delta: u8, ddt: &DdtTables) -> Vec<ByteSet> {
        let mut table = vec![ByteSet::empty(); 3 << 24];
        for &dout in ddt.possible_outputs(delta) {
            let delta_x7 = l_from_msb(dout) ^ ((delta as u32) << 8);
            let dx0 = (delta_x7 >> 16) as u8;
            let dx1 = (delta_x7 >> 8) as u8;
            let dx2 = delta_x7 as u8;
            for &dy0 in ddt.possible_outputs(dx0) {
                let s0 = ddt.set(dx0, dy0);
                for &dy1 in ddt.possible_outputs(dx1) {
                    let s1 = ddt.set(dx1, dy1);
                    let hi = ((dy0 as u32) << 16) ^ ((dy1 as u32) << 8);
                    for &dy2 in ddt.possible_outputs(dx2) {
                        let delta_z7 = linear_layer(hi ^ dy2 as u32);
                        let slot = (delta_z7 as usize) * 3;
                        table[slot] = table[slot].union(s0);
                        table[slot + 1] = table[slot + 1].union(s1);
                        table[slot + 2] = table[slot + 2].union(ddt.set(dx2, dy2));
                    }
                }
            }
        }
        table
    }

    /// The three lane sets for `(pair, delta_z7)`.
    #[inline(always)]
    pub fn lanes(&self, pair: usize, delta_z7: u32) -> &[ByteSet] {
        let base = (delta_z7 as usize) * 3;
        &self.per_pair[pair][base..base + 3]
    }
}
