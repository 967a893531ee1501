//! # Residue — Incremental Small-Prime Congruence Wheel
//!
//! Maintains `congruence[i] = (-N) mod primes[i]` for the first
//! [`crate::primes::INITIAL_SEG`] primes without ever dividing `N` again:
//! each step of the driver only adds a small delta (2, 4, or 6) to `N`, so
//! the congruences can be updated by subtracting the same delta and
//! wrapping. This is the hot path of the search — the driver visits one
//! new `N` per step, and this avoids sixteen divisions per step.
//!
//! `congruence[i] == 0` iff `primes[i]` divides `N`.

use crate::primes::{PrimeTable, INITIAL_SEG};

/// Per-candidate residues of `N` modulo the first `INITIAL_SEG` primes.
#[derive(Clone, Debug)]
pub struct ResidueWheel {
    congruence: [u64; INITIAL_SEG],
}

impl ResidueWheel {
    /// Compute congruences from scratch for a given `n` (used once at
    /// startup/resume; every subsequent candidate is reached by `advance`).
    pub fn init(table: &PrimeTable, n: u64) -> Self {
        let mut congruence = [0u64; INITIAL_SEG];
        for i in 0..INITIAL_SEG {
            let p = table.primes[i];
            let r = n % p;
            congruence[i] = if r == 0 { 0 } else { p - r };
        }
        ResidueWheel { congruence }
    }

    /// Advance past a delta added to `N` (2, 4, or 6 in practice), updating
    /// every residue by subtracting the delta mod `primes[i]`.
    pub fn advance(&mut self, table: &PrimeTable, delta: u64) {
        for i in 0..INITIAL_SEG {
            let p = table.primes[i];
            let d = delta % p;
            self.congruence[i] = if self.congruence[i] >= d {
                self.congruence[i] - d
            } else {
                self.congruence[i] + p - d
            };
        }
    }

    /// `true` iff `primes[i]` divides the current `N`.
    #[inline]
    pub fn divisible(&self, i: usize) -> bool {
        self.congruence[i] == 0
    }

    /// Raw congruence value (`(-N) mod primes[i]`), for testing the wheel
    /// invariant directly.
    #[inline]
    pub fn congruence(&self, i: usize) -> u64 {
        self.congruence[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_matches_definition() {
        let t = PrimeTable::generate();
        let n = 7 * 11 * 13 + 4; // not divisible by 7, 11, or 13
        let w = ResidueWheel::init(&t, n);
        for i in 0..INITIAL_SEG {
            let p = t.primes[i];
            let expect = (p - n % p) % p;
            assert_eq!(w.congruence(i), expect, "prime index {i}");
        }
    }

    #[test]
    fn divisibility_flag_matches_mod() {
        let t = PrimeTable::generate();
        let n = t.primes[3] * 5; // divisible by primes[3], not a multiple of small deltas otherwise
        let w = ResidueWheel::init(&t, n);
        assert!(w.divisible(3));
    }

    #[test]
    fn advance_matches_recompute_from_scratch() {
        let t = PrimeTable::generate();
        let mut n = 1_000_003u64;
        let mut w = ResidueWheel::init(&t, n);
        for &delta in &[6u64, 2, 4, 6, 6, 4, 2] {
            n += delta;
            w.advance(&t, delta);
            let fresh = ResidueWheel::init(&t, n);
            for i in 0..INITIAL_SEG {
                assert_eq!(w.congruence(i), fresh.congruence(i), "prime index {i} after delta {delta}");
            }
        }
    }

    #[test]
    fn wheel_invariant_holds_across_many_steps() {
        let t = PrimeTable::generate();
        let mut n = 30_000_001u64;
        let mut w = ResidueWheel::init(&t, n);
        let deltas = [6u64, 2, 4, 6, 6, 4, 2];
        for step in 0..1000 {
            let delta = deltas[step % deltas.len()];
            n += delta;
            w.advance(&t, delta);
            for i in 0..INITIAL_SEG {
                let p = t.primes[i];
                assert_eq!(w.congruence(i), (p - n % p) % p);
            }
        }
    }
}
