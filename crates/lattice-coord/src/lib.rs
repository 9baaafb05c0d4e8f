// SPDX-License-Identifier: Apache-2.0
//! Six-digit base-60 coordinate algebra for the lattice archive.
//!
//! [`Coordinate`] is the address type for every cell of the archive's
//! ≈46.6-billion-cell space. It is deliberately a small `Copy` value —
//! six digits plus a universe counter — so the walker can format and
//! reparse it every step without touching the heap.
//!
//! # Digit Order
//!
//! Internally digits are stored least-significant first (`d0..d5`). The
//! canonical string form is most-significant first (`"d5 d4 d3 d2 d1 d0"`),
//! matching the shard path order used by the store.
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

use std::fmt;

/// Number of digits in a coordinate.
pub const DIGITS: usize = 6;
/// Radix of each digit.
pub const BASE: u64 = 60;
/// Size of the coordinate space, `60^6`.
pub const SPACE_SIZE: u64 = 46_656_000_000;

/// Errors produced while parsing a coordinate string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    /// The string did not split into exactly six whitespace-separated parts.
    #[error("expected 6 space-separated digits, got {found}")]
    WrongPartCount {
        /// Number of parts actually found.
        found: usize,
    },
    /// A part was not a decimal integer in `[0,59]`.
    #[error("digit {part:?} is not a valid base-60 digit (0-59)")]
    InvalidDigit {
        /// The offending token.
        part: String,
    },
}

/// A point in the six-digit, radix-60 coordinate space, plus its universe
/// overflow counter.
///
/// Digits are stored least-significant first. `universe` counts how many
/// times arithmetic has overflowed past the top digit (positive) or
/// underflowed below the bottom (negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    digits: [u8; DIGITS],
    universe: i64,
}

impl Coordinate {
    /// The zero coordinate, `"0 0 0 0 0 0"`.
    pub const ZERO: Coordinate = Coordinate {
        digits: [0; DIGITS],
        universe: 0,
    };

    /// Build a coordinate from least-significant-first digits. Each digit
    /// is reduced mod 60 (no overflow accounting — use [`increment`] for
    /// that).
    ///
    /// [`increment`]: Coordinate::increment
    pub fn from_digits(digits: [u8; DIGITS]) -> Self {
        let mut d = digits;
        for x in &mut d {
            *x %= BASE as u8;
        }
        Self {
            digits: d,
            universe: 0,
        }
    }

    /// Parse a canonical coordinate string: six whitespace-separated
    /// decimal digits, most-significant first, each in `[0,59]`.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if the string does not have exactly six
    /// parts or a part is not a valid base-60 digit.
    pub fn parse(s: &str) -> Result<Self, CoordinateError> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() != DIGITS {
            return Err(CoordinateError::WrongPartCount {
                found: parts.len(),
            });
        }
        let mut digits = [0u8; DIGITS];
        for (i, part) in parts.iter().enumerate() {
            let value: u64 = part
                .parse()
                .map_err(|_| CoordinateError::InvalidDigit {
                    part: (*part).to_string(),
                })?;
            if value >= BASE {
                return Err(CoordinateError::InvalidDigit {
                    part: (*part).to_string(),
                });
            }
            // parts[0] is d5 (most significant), parts[5] is d0.
            digits[DIGITS - 1 - i] = value as u8;
        }
        Ok(Self {
            digits,
            universe: 0,
        })
    }

    /// Render the canonical coordinate string, most-significant digit
    /// first.
    pub fn format(&self) -> String {
        self.digits
            .iter()
            .rev()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The least-significant-first digit array.
    pub fn digits(&self) -> [u8; DIGITS] {
        self.digits
    }

    /// The universe overflow counter accumulated via [`increment`]/[`decrement`].
    ///
    /// [`increment`]: Coordinate::increment
    /// [`decrement`]: Coordinate::decrement
    pub fn universe(&self) -> i64 {
        self.universe
    }

    /// Base-10 value of the digits, `Σ dᵢ · 60ⁱ`, always `< SPACE_SIZE`.
    pub fn to_base10(&self) -> u64 {
        self.digits
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, &d)| acc + u64::from(d) * BASE.pow(i as u32))
    }

    /// Build a coordinate from a base-10 value, reducing mod `SPACE_SIZE`
    /// and zero-padding to six digits.
    pub fn from_base10(n: u64) -> Self {
        let mut n = n % SPACE_SIZE;
        let mut digits = [0u8; DIGITS];
        for d in &mut digits {
            *d = (n % BASE) as u8;
            n /= BASE;
        }
        Self {
            digits,
            universe: 0,
        }
    }

    /// Advance by one, rippling carry through the digits. Overflow past the
    /// top digit increments [`universe`](Coordinate::universe).
    pub fn increment(&mut self) {
        self.update(1);
    }

    /// Retreat by one, rippling borrow through the digits. Underflow below
    /// the bottom digit decrements [`universe`](Coordinate::universe).
    pub fn decrement(&mut self) {
        self.update(-1);
    }

    fn update(&mut self, delta: i8) {
        for i in 0..DIGITS {
            let v = i64::from(self.digits[i]) + i64::from(delta);
            if delta > 0 && v == BASE as i64 {
                self.digits[i] = 0;
                if i == DIGITS - 1 {
                    self.universe += 1;
                }
                continue;
            } else if delta < 0 && v == -1 {
                self.digits[i] = BASE as u8 - 1;
                if i == DIGITS - 1 {
                    self.universe -= 1;
                }
                continue;
            }
            self.digits[i] = v as u8;
            break;
        }
    }

    /// Distance from `self` to `to`, as `(to.to_base10() - self.to_base10()) mod SPACE_SIZE`,
    /// returned in six-digit form.
    pub fn distance(&self, to: &Coordinate) -> Coordinate {
        let delta = (i128::from(to.to_base10()) - i128::from(self.to_base10()))
            .rem_euclid(i128::from(SPACE_SIZE));
        Coordinate::from_base10(delta as u64)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── 1. parse/format round-trip on the spec's worked example ─────────

    #[test]
    fn parse_format_worked_example() {
        let c = Coordinate::parse("3 0 59 12 0 1").expect("valid coordinate");
        assert_eq!(c.digits(), [1, 0, 12, 59, 0, 3]);
        assert_eq!(c.format(), "3 0 59 12 0 1");
        // 1 + 0*60 + 12*3600 + 59*216_000 + 0*12_960_000 + 3*777_600_000.
        assert_eq!(c.to_base10(), 2_345_587_201);
    }

    // ── 2. parse rejects malformed input ─────────────────────────────────

    #[test]
    fn parse_rejects_wrong_count() {
        let err = Coordinate::parse("1 2 3").unwrap_err();
        assert_eq!(err, CoordinateError::WrongPartCount { found: 3 });
    }

    #[test]
    fn parse_rejects_out_of_range_digit() {
        let err = Coordinate::parse("0 0 0 0 0 60").unwrap_err();
        assert_eq!(
            err,
            CoordinateError::InvalidDigit {
                part: "60".to_string()
            }
        );
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert!(Coordinate::parse("a 0 0 0 0 0").is_err());
    }

    // ── 3. base10 round trip across the full space, sampled ────────────

    #[test]
    fn base10_round_trip_sampled() {
        for n in (0..SPACE_SIZE).step_by(104_729) {
            let c = Coordinate::from_base10(n);
            assert_eq!(c.to_base10(), n);
        }
    }

    #[test]
    fn base10_wraps_mod_space_size() {
        let c = Coordinate::from_base10(SPACE_SIZE + 5);
        assert_eq!(c.to_base10(), 5);
    }

    // ── 4. increment/decrement carry and universe accounting ────────────

    #[test]
    fn increment_wraps_bottom_digit_without_universe_change() {
        let mut c = Coordinate::parse("0 0 0 0 0 59").expect("valid");
        c.increment();
        assert_eq!(c.format(), "0 0 0 0 1 0");
        assert_eq!(c.universe(), 0);
    }

    #[test]
    fn increment_overflows_top_digit_bumps_universe() {
        let mut c = Coordinate::parse("59 59 59 59 59 59").expect("valid");
        c.increment();
        assert_eq!(c.format(), "0 0 0 0 0 0");
        assert_eq!(c.universe(), 1);
    }

    #[test]
    fn decrement_underflows_top_digit_drops_universe() {
        let mut c = Coordinate::ZERO;
        c.decrement();
        assert_eq!(c.format(), "59 59 59 59 59 59");
        assert_eq!(c.universe(), -1);
    }

    #[test]
    fn increment_then_decrement_is_identity() {
        let mut c = Coordinate::parse("10 20 30 40 50 59").expect("valid");
        let before = c;
        c.increment();
        c.decrement();
        assert_eq!(c, before);
    }

    // ── 5. distance ───────────────────────────────────────────────────────

    #[test]
    fn distance_is_zero_for_equal_coordinates() {
        let c = Coordinate::parse("1 2 3 4 5 6").expect("valid");
        assert_eq!(c.distance(&c).to_base10(), 0);
    }

    #[test]
    fn distance_matches_base10_difference() {
        let a = Coordinate::from_base10(100);
        let b = Coordinate::from_base10(250);
        assert_eq!(a.distance(&b).to_base10(), 150);
    }

    #[test]
    fn distance_wraps_when_to_precedes_self() {
        let a = Coordinate::from_base10(SPACE_SIZE - 1);
        let b = Coordinate::from_base10(1);
        assert_eq!(a.distance(&b).to_base10(), 2);
    }
}
