//! Tabulates how many rk8 lane candidates each `(delta, delta_y7)`
//! combination admits, weighted by the DDT.
//!
//! For `j = 0, 1, 2` the count is the DDT weight of the transition in lane
//! `j`; `j = 3` is the product over all three lanes, i.e. the number of
//! full rk8 candidates. Reports the maximum, the average, the number of
//! unreachable combinations and the value histogram per `j`.
//!
//! Deltas are independent, so each 2^24-entry counter slice is processed
//! on its own worker and merged into the global statistics.

use rayon::prelude::*;

use halfloop_attack::cipher::{mix_columns, rotate_rows, SBOX};

const HIST_BINS: usize = 1 << 16;

struct Stats {
    hist: Vec<u64>,
    max: u16,
    sum: u64,
    zeros: u64,
}

impl Stats {
    fn new() -> Self {
        Stats {
            hist: vec![0; HIST_BINS],
            max: 0,
            sum: 0,
            zeros: 0,
        }
    }

    fn absorb_slice(mut self, counts: &[u16]) -> Self {
        for &n in counts {
            self.hist[n as usize] += 1;
            self.max = self.max.max(n);
            self.sum += n as u64;
            if n == 0 {
                self.zeros += 1;
            }
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        for (a, b) in self.hist.iter_mut().zip(&other.hist) {
            *a += b;
        }
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.zeros += other.zeros;
        self
    }
}

fn main() {
    println!("Computing distributions of rk8 lane candidates");

    let mut ddt = vec![[0u32; 256]; 256];
    for x in 0..256usize {
        for din in 0..256usize {
            let dout = (SBOX[x] ^ SBOX[x ^ din]) as usize;
            ddt[din][dout] += 1;
        }
    }

    for j in 0..4 {
        println!("Running computation for j = {j}");

        let stats = (1u32..256)
            .into_par_iter()
            .map(|delta| {
                let mut counts = vec![0u16; 1 << 24];
                for gamma in 1..256usize {
                    if ddt[delta as usize][gamma] == 0 {
                        continue;
                    }
                    let delta_x7 = mix_columns(rotate_rows((gamma as u32) << 16)) ^ (delta << 8);
                    let dx0 = ((delta_x7 >> 16) & 0xFF) as usize;
                    let dx1 = ((delta_x7 >> 8) & 0xFF) as usize;
                    let dx2 = (delta_x7 & 0xFF) as usize;

                    for dy0 in 0..256usize {
                        let w0 = ddt[dx0][dy0];
                        if w0 == 0 {
                            continue;
                        }
                        for dy1 in 0..256usize {
                            let w1 = ddt[dx1][dy1];
                            if w1 == 0 {
                                continue;
                            }
                            let hi = (dy0 << 16) ^ (dy1 << 8);
                            for dy2 in 0..256usize {
                                let w2 = ddt[dx2][dy2];
                                if w2 == 0 {
                                    continue;
                                }
                                let weight = match j {
                                    0 => w0,
                                    1 => w1,
                                    2 => w2,
                                    _ => w0 * w1 * w2,
                                };
                                counts[hi ^ dy2] += weight as u16;
                            }
                        }
                    }
                }
                Stats::new().absorb_slice(&counts)
            })
            .reduce(Stats::new, Stats::merge);

        let total = 255.0 * (1u64 << 24) as f64;
        println!("MAX: {}", stats.max);
        println!("Avg: {}", stats.sum as f64 / total);
        println!("#Zeros: {}", stats.zeros);
        for (value, count) in stats.hist.iter().enumerate() {
            if *count != 0 {
                println!("HIST_{j}[{value}] = {count}");
            }
        }
    }
}
