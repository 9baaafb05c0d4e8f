// SPDX-License-Identifier: Apache-2.0
//! Deterministic hash-seeded navigation path over the lattice coordinate
//! space.
//!
//! [`PathWalker`] is a pure function of `(start, key)` plus a step count: no
//! persistent state outlives the value itself, so two walkers built from the
//! same `(start, key)` always emit the same sequence of `(coordinate,
//! universe)` pairs (see the crate tests for the determinism property this
//! guarantees).
//!
//! # Seed Derivation
//!
//! Both seeds are derived from BLAKE2b truncated to an 8-byte (64-bit)
//! digest — this is not used for collision resistance, it is a mixing
//! function. See [`SPEC_FULL.md §4.2`] in the repository root for the exact
//! recurrence this implements.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

use blake2::digest::{consts::U8, Digest};
use blake2::Blake2b;
use lattice_coord::Coordinate;

/// BLAKE2b configured for an 8-byte (64-bit) digest, matching the seed
/// derivation in the spec.
type Blake2b64 = Blake2b<U8>;

/// `2^32`, the modulus of the imaginary register.
const M: u64 = 1 << 32;
/// Golden-ratio mix multiplier used in the imaginary step.
const A: u32 = 0x9E37_79B9;

fn hash64(input: &str) -> u64 {
    let digest = Blake2b64::new_with_prefix(input.as_bytes()).finalize();
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest);
    u64::from_be_bytes(buf)
}

fn coord_const(digits: [u8; 6]) -> u32 {
    const WEIGHTS: [u64; 6] = [13, 17, 19, 23, 29, 31];
    let acc: u64 = digits
        .iter()
        .zip(WEIGHTS)
        .map(|(&d, w)| w * u64::from(d))
        .sum();
    (acc & 0xFFFF_FFFF) as u32
}

/// A deterministic walk seeded by `(start, key)`.
///
/// Holds only three integers: the current coordinate's base-10 value, the
/// evolving imaginary register, and the static per-key space offset `X`. No
/// persistent state beyond that — replaying from the same `(start, key)`
/// reproduces the identical sequence.
#[derive(Debug, Clone, Copy)]
pub struct PathWalker {
    coord_dec: u64,
    imag: u32,
    x: u64,
}

impl PathWalker {
    /// Seed a walker at `start` using `key` as the navigation secret.
    pub fn new(start: Coordinate, key: &str) -> Self {
        let coord_dec = start.to_base10();
        let imag = (hash64(&format!("{}|{key}", start.format())) % M) as u32;
        let x = hash64(&format!("{coord_dec}|{key}")) % lattice_coord::SPACE_SIZE;
        Self { coord_dec, imag, x }
    }

    /// The current coordinate, i.e. the last value emitted by [`step`] (or
    /// `start` if `step` has not yet been called).
    ///
    /// [`step`]: PathWalker::step
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::from_base10(self.coord_dec)
    }

    /// The imaginary register at the current position — this is the
    /// `universe` tag a block written at [`coordinate`](PathWalker::coordinate)
    /// should use.
    pub fn imag(&self) -> u32 {
        self.imag
    }

    /// Advance the walk by one step, returning the newly visited coordinate.
    ///
    /// Never fails: the recurrence is total over `u64 mod SPACE_SIZE`.
    pub fn step(&mut self) -> Coordinate {
        let prev_digits = Coordinate::from_base10(self.coord_dec).digits();

        let real_sq = i128::from(self.coord_dec) * i128::from(self.coord_dec);
        let imag_sq = i128::from(self.imag) * i128::from(self.imag);
        let raw = real_sq - imag_sq + i128::from(self.x);
        self.coord_dec = raw.rem_euclid(i128::from(lattice_coord::SPACE_SIZE)) as u64;

        let curr_digits = Coordinate::from_base10(self.coord_dec).digits();

        let mix = self.imag ^ coord_const(prev_digits) ^ coord_const(curr_digits);
        self.imag = mix.wrapping_mul(A).wrapping_add(1);

        self.coordinate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_walker(start: &str, key: &str) -> PathWalker {
        PathWalker::new(Coordinate::parse(start).expect("valid coordinate"), key)
    }

    // ── 1. determinism: two independent walkers agree step-for-step ────

    #[test]
    fn determinism_across_independent_walkers() {
        let mut a = key_walker("0 0 0 0 0 0", "hello");
        let mut b = key_walker("0 0 0 0 0 0", "hello");
        for _ in 0..50 {
            assert_eq!(a.step(), b.step());
            assert_eq!(a.imag(), b.imag());
        }
    }

    // ── 2. closure: every emitted digit stays in [0,59] ─────────────────

    #[test]
    fn walk_closure_digits_in_range() {
        let mut w = key_walker("0 0 0 0 0 0", "closure-check");
        for _ in 0..500 {
            let c = w.step();
            for d in c.digits() {
                assert!(d < 60);
            }
        }
    }

    // ── 3. different keys diverge ────────────────────────────────────────

    #[test]
    fn different_keys_diverge() {
        let mut a = key_walker("0 0 0 0 0 0", "key-a");
        let mut b = key_walker("0 0 0 0 0 0", "key-b");
        let seq_a: Vec<_> = (0..10).map(|_| a.step()).collect();
        let seq_b: Vec<_> = (0..10).map(|_| b.step()).collect();
        assert_ne!(seq_a, seq_b);
    }

    // ── 4. replaying N steps from scratch matches N steps of a live walker ─

    #[test]
    fn replay_from_scratch_matches_live_walker() {
        let mut live = key_walker("12 1 2 3 4 5", "replay-check");
        for _ in 0..37 {
            live.step();
        }
        let mut replay = key_walker("12 1 2 3 4 5", "replay-check");
        for _ in 0..37 {
            replay.step();
        }
        assert_eq!(live.coordinate(), replay.coordinate());
        assert_eq!(live.imag(), replay.imag());
    }

    // ── 5. start coordinate is not itself emitted by step ───────────────

    #[test]
    fn first_step_differs_from_start() {
        let start = Coordinate::parse("0 0 0 0 0 0").expect("valid");
        let mut w = PathWalker::new(start, "abc");
        assert_eq!(w.coordinate(), start);
        let first = w.step();
        // Exceedingly unlikely (1 in ~4.6e10) to coincide; guards against a
        // no-op real step.
        assert_ne!(first, start);
    }

    // ── 6. hash64 produces a stable value for a fixed input ─────────────

    #[test]
    fn hash64_is_stable() {
        assert_eq!(hash64("fixed-input"), hash64("fixed-input"));
    }
}
