//! End-to-end demonstration of the HALFLOOP-24 key-recovery attack.
//!
//! Each run fixes a fresh random master key, gathers chosen-plaintext
//! pairs, precomputes the differential tables and sweeps the configured
//! `(rk10, rk9)` rectangle. With the default bounds this checks 2^32 of
//! the 2^48 possible guesses; pass `--max-rk10 0x1000000 --max-rk9
//! 0x1000000` for the full attack.

use std::time::Instant;

use clap::Parser;
use rand::rngs::OsRng;
use rand::RngCore;

use halfloop_attack::cipher::key_schedule;
use halfloop_attack::differential::{DdtTables, PairTables};
use halfloop_attack::linear::inv_linear_layer;
use halfloop_attack::pairs::generate_pairs;
use halfloop_attack::search::{Guess, KeySearch, SearchParams};
use halfloop_attack::Error;

#[derive(Parser, Debug)]
#[command(about = "Differential key-recovery attack on HALFLOOP-24")]
struct Args {
    /// Enumerate rk10 guesses below this bound (full attack: 0x1000000)
    #[arg(long, default_value_t = 0x10000)]
    max_rk10: u64,

    /// Enumerate L^-1(rk9) guesses below this bound (full attack: 0x1000000)
    #[arg(long, default_value_t = 0x10000)]
    max_rk9: u64,

    /// Number of chosen-plaintext pairs
    #[arg(long, default_value_t = 3)]
    pairs: usize,

    /// Number of independent attack runs
    #[arg(long, default_value_t = 5)]
    reps: u32,

    /// Evaluate the key-schedule-correct guess before the sweep
    #[arg(long)]
    check_correct_first: bool,

    /// Collect filter statistics (slows the hot loop)
    #[arg(long)]
    counters: bool,

    /// Run the outer enumeration on a single thread
    #[arg(long)]
    serial: bool,
}

fn main() {
    let args = Args::parse();

    println!("FLAGS:");
    println!("  - check_correct_first: {}", args.check_correct_first);
    println!("  - counters: {}", args.counters);
    println!("  - parallel: {}", !args.serial);
    println!("Running the attack {} times...", args.reps);
    println!();

    // Tweak-independent tables live across runs; only the per-pair tables
    // are rebuilt.
    let ddt = DdtTables::build();

    for run in 0..args.reps {
        println!("Run {run}:");
        if let Err(e) = run_attack(&args, &ddt) {
            eprintln!("run {run} aborted: {e}");
        }
        println!();
    }
}

fn run_attack(args: &Args, ddt: &DdtTables) -> Result<(), Error> {
    println!("Step 0: Fix key");
    let mut key_bytes = [0u8; 16];
    OsRng.try_fill_bytes(&mut key_bytes)?;
    let key = u128::from_be_bytes(key_bytes);
    println!("master key: {key:#034x}");
    let rk = key_schedule(key, 0);
    for (i, k) in rk.iter().enumerate() {
        println!("RK[{i}] = {k:#x}");
    }
    println!("L^(-1)(RK[7])_0 = {:#x}", inv_linear_layer(rk[7]) >> 16);
    println!();

    println!("Step 1: Generating data:");
    let start = Instant::now();
    let pairs = generate_pairs(&mut OsRng, key, args.pairs)?;
    println!("Took {} queries and {:?}", 2 * pairs.len(), start.elapsed());
    println!();

    println!("Step 2: Precomputations");
    let start = Instant::now();
    let tables = PairTables::build(&pairs, ddt);
    println!("Took {:?}", start.elapsed());
    println!();

    println!("Step 3: Identify key candidates");
    let guesses = args.max_rk10 * args.max_rk9;
    println!("Checking {guesses} of 2**48 candidates for (rk9, rk10).");
    println!("Using {} pairs.", pairs.len());
    if !args.serial {
        println!("worker threads: {}", rayon::current_num_threads());
    }

    let params = SearchParams {
        max_rk10: args.max_rk10,
        max_rk9: args.max_rk9,
        parallel: !args.serial,
        counters: args.counters,
    };
    let search = KeySearch::new(&pairs, ddt, &tables)?;
    let probe = if args.check_correct_first {
        Some(Guess::from_master_key(key, &pairs)?)
    } else {
        None
    };

    let start = Instant::now();
    let outcome = search.run_with_probe(&params, probe)?;
    let elapsed = start.elapsed();

    for candidate in &outcome.candidates {
        println!("{candidate}");
    }
    println!(
        "Took      {}ns = {} * {}ns",
        elapsed.as_nanos(),
        guesses,
        elapsed.as_nanos() / (guesses as u128).max(1)
    );

    if args.counters {
        let c = &outcome.counters;
        let total = guesses as f64;
        println!("Note: counter bookkeeping slows the hot loop; disable it when benchmarking.");
        println!();
        for j in 0..3 {
            println!(
                "Average number of candidates for rk8 lane {j}: {}",
                c.rk8_lane[j] as f64 / total / pairs.len() as f64
            );
        }
        println!("Survived rk8 filter: {}", c.survived_rk8 as f64 / total);
        println!("Survived Delta y6 filter: {}", c.survived_dy6 as f64 / total);
        println!("Survived rk7 filter: {}", c.survived_rk7 as f64 / total);
    }
    Ok(())
}
