//! Byte-indexed lookup tables for the linear layer `L = mix_columns ∘
//! rotate_rows` and its inverse.
//!
//! `L` is GF(2)-linear, so each output lane is the XOR of three per-input-
//! lane table entries. The search kernel only ever touches these tables;
//! the bit-level equations in [`crate::cipher`] exist to generate them.
//! Tables are built once per process and shared read-only.

use once_cell::sync::Lazy;

use crate::cipher::{inv_mix_columns, inv_rotate_rows, mix_columns, rotate_rows};

struct LinearTables {
    /// `fwd[lane][src][b]`: contribution of input byte `b` in lane `src`
    /// to output lane `lane` of `L`.
    fwd: [[[u8; 256]; 3]; 3],
    /// Same for `L^-1`.
    inv: [[[u8; 256]; 3]; 3],
    /// `L(b << 16)` for every byte value `b`.
    from_msb: [u32; 256],
}

static TABLES: Lazy<LinearTables> = Lazy::new(LinearTables::build);

impl LinearTables {
    fn build() -> Self {
        let mut fwd = [[[0u8; 256]; 3]; 3];
        let mut inv = [[[0u8; 256]; 3]; 3];
        let mut from_msb = [0u32; 256];
        for b in 0..256usize {
            for src in 0..3 {
                let f = mix_columns(rotate_rows((b as u32) << (8 * (2 - src))));
                let g = inv_rotate_rows(inv_mix_columns((b as u32) << (8 * (2 - src))));
                for lane in 0..3 {
                    fwd[lane][src][b] = (f >> (8 * (2 - lane))) as u8;
                    inv[lane][src][b] = (g >> (8 * (2 - lane))) as u8;
                }
            }
            from_msb[b] = mix_columns(rotate_rows((b as u32) << 16));
        }
        LinearTables { fwd, inv, from_msb }
    }
}

#[inline(always)]
fn apply(tables: &[[[u8; 256]; 3]; 3], s: u32) -> u32 {
    let b0 = ((s >> 16) & 0xFF) as usize;
    let b1 = ((s >> 8) & 0xFF) as usize;
    let b2 = (s & 0xFF) as usize;
    let l0 = tables[0][0][b0] ^ tables[0][1][b1] ^ tables[0][2][b2];
    let l1 = tables[1][0][b0] ^ tables[1][1][b1] ^ tables[1][2][b2];
    let l2 = tables[2][0][b0] ^ tables[2][1][b1] ^ tables[2][2][b2];
    ((l0 as u32) << 16) ^ ((l1 as u32) << 8) ^ l2 as u32
}

/// `mix_columns(rotate_rows(s))`, via table lookups.
#[inline(always)]
pub fn linear_layer(s: u32) -> u32 {
    apply(&TABLES.fwd, s)
}

/// `inv_rotate_rows(inv_mix_columns(s))`, via table lookups.
#[inline(always)]
pub fn inv_linear_layer(s: u32) -> u32 {
    apply(&TABLES.inv, s)
}

/// `linear_layer(b << 16)` for a single MSB-lane byte.
#[inline(always)]
pub fn l_from_msb(b: u8) -> u32 {
    TABLES.from_msb[b as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn tables_match_bit_level_equations() {
        let mut rng = StdRng::seed_from_u64(0x1e57);
        for _ in 0..10_000 {
            let s = rng.gen::<u32>() & 0xFF_FFFF;
            assert_eq!(linear_layer(s), mix_columns(rotate_rows(s)));
            assert_eq!(inv_linear_layer(s), inv_rotate_rows(inv_mix_columns(s)));
        }
    }

    #[test]
    fn forward_and_inverse_round_trip() {
        let mut rng = StdRng::seed_from_u64(0x1e58);
        for _ in 0..10_000 {
            let s = rng.gen::<u32>() & 0xFF_FFFF;
            assert_eq!(inv_linear_layer(linear_layer(s)), s);
            assert_eq!(linear_layer(inv_linear_layer(s)), s);
        }
    }

    #[test]
    fn single_lane_inputs_cover_the_tables() {
        // every table entry is exercised by some single-active-byte state
        for b in 0..256u32 {
            for shift in [0, 8, 16] {
                let s = b << shift;
                assert_eq!(linear_layer(s), mix_columns(rotate_rows(s)));
            }
            assert_eq!(l_from_msb(b as u8), mix_columns(rotate_rows(b << 16)));
        }
    }

    #[test]
    fn linearity() {
        let mut rng = StdRng::seed_from_u64(0x1e59);
        for _ in 0..1_000 {
            let a = rng.gen::<u32>() & 0xFF_FFFF;
            let b = rng.gen::<u32>() & 0xFF_FFFF;
            assert_eq!(linear_layer(a ^ b), linear_layer(a) ^ linear_layer(b));
        }
    }
}
