//! Differential key-recovery attack on the HALFLOOP-24 tweakable block
//! cipher.
//!
//! Given a handful of chosen-plaintext / chosen-tweak pairs encrypted under
//! an unknown 128-bit key, the attack recovers candidates for the late
//! round keys `(L^-1(rk7)_0, rk8, rk9, rk10)`, leaving the rest of the key
//! to a conventional brute force.
//!
//! # Structure
//!
//! - [`cipher`]: the HALFLOOP-24 primitive and the tweak-normalisation of
//!   round keys.
//! - [`linear`]: the linear layer as byte-indexed lookup tables.
//! - [`byteset`]: 256-bit sets of byte values with an O(1) XOR-shift.
//! - [`differential`]: the value-aware DDT and the per-pair tables of
//!   feasible round-8 S-box outputs.
//! - [`pairs`]: chosen-plaintext data generation.
//! - [`search`]: the parallel enumeration of `(rk10, rk9)` guesses.
//!
//! # Example
//!
//! ```no_run
//! use halfloop_attack::differential::{DdtTables, PairTables};
//! use halfloop_attack::pairs::generate_pairs;
//! use halfloop_attack::search::{KeySearch, SearchParams};
//!
//! let key = 0x2b7e151628aed2a6_abf7158809cf4f3c;
//! let mut rng = rand::rngs::OsRng;
//! let pairs = generate_pairs(&mut rng, key, 3)?;
//! let ddt = DdtTables::build();
//! let tables = PairTables::build(&pairs, &ddt);
//! let search = KeySearch::new(&pairs, &ddt, &tables)?;
//! let outcome = search.run(&SearchParams::default())?;
//! for candidate in &outcome.candidates {
//!     println!("{candidate}");
//! }
//! # Ok::<(), halfloop_attack::Error>(())
//! ```

pub mod byteset;
pub mod cipher;
pub mod differential;
pub mod error;
pub mod linear;
pub mod pairs;
pub mod search;

pub use byteset::ByteSet;
pub use error::Error;
pub use pairs::Pair;
pub use search::{Candidate, Counters, Guess, KeySearch, SearchOutcome, SearchParams};
