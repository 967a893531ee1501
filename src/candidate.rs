//! # Candidate — Per-`N` Factoring State
//!
//! A fresh [`CandidateState`] is created for every `N` the driver visits.
//! Only the prime table and batch products ([`crate::primes::PrimeTable`])
//! are immutable shared data; everything else here is owned and
//! single-threaded, which is what lets [`crate::search`] partition the
//! search interval across workers without any locking in the hot path.
//!
//! `factored` tracks **twice** the product of fully extracted prime powers
//! (not the product itself) — this lets the pipeline's early-rejection
//! checks compare `presum >= factored` directly instead of recomputing
//! `2 * product` at every step. The initial value of 2 encodes the empty
//! product (`1`) doubled. This is resolved against the reference
//! implementation (`fwjmath/weird-odd-engine`), whose `factor_init` sets
//! `factored = 2` and every extraction multiplies it by the full prime
//! power, not by `2 * prime power`.

use rug::Integer;

/// A single extracted prime power, `(p, k)` meaning `p^k` divided `N`.
pub type Factor = (u64, u32);

/// Mutable per-candidate factoring state, threaded through the pipeline.
pub struct CandidateState {
    /// The integer under test.
    pub n: u64,
    /// Unfactored remainder; `cofactor * (extracted product) == n`.
    pub cofactor: u64,
    /// Twice the product of prime powers extracted so far; starts at 2.
    pub factored: u128,
    /// Accumulated `sigma(extracted product)`.
    pub presum: Integer,
    /// Extracted prime powers, in extraction order (not necessarily
    /// ascending once stage E starts extracting large factors).
    pub factors: Vec<Factor>,
}

impl CandidateState {
    /// Fresh state for a new candidate `n`.
    pub fn new(n: u64) -> Self {
        CandidateState {
            n,
            cofactor: n,
            factored: 2,
            presum: Integer::from(1u32),
            factors: Vec::new(),
        }
    }

    /// Divide `p` out of `cofactor` to its full multiplicity, updating
    /// `presum` and `factored` and recording the extraction. No-op if `p`
    /// does not divide `cofactor`.
    pub fn extract(&mut self, p: u64) {
        if self.cofactor % p != 0 {
            return;
        }
        let mut mult: u32 = 0;
        let mut pk: u64 = 1;
        let mut sigma_terms: u64 = 1; // 1 + p + p^2 + ... (overflow-checked below)
        let mut term: u64 = 1;
        loop {
            self.cofactor /= p;
            pk = pk.checked_mul(p).expect("prime power overflow in extract");
            term = term
                .checked_mul(p)
                .expect("sigma term overflow in extract");
            sigma_terms = sigma_terms
                .checked_add(term)
                .expect("sigma accumulation overflow in extract");
            mult += 1;
            if self.cofactor % p != 0 {
                break;
            }
        }
        self.factored *= pk as u128;
        self.presum *= sigma_terms;
        self.factors.push((p, mult));
    }

    /// Divide a large (possibly non-trial-divisible) prime `p` out of
    /// `cofactor` to its full multiplicity, using bignum sigma (the
    /// trial-division path above assumes the `1+p+...+p^k` sum fits a
    /// `u64`, which large factors in stage E routinely violate).
    pub fn extract_big(&mut self, p: &Integer) {
        let p_u64 = p.to_u64().expect("stage E factors must fit u64 for this search's N bound");
        if self.cofactor % p_u64 != 0 {
            return;
        }
        let mut mult: u32 = 0;
        let mut pk: u64 = 1;
        let mut sigma = Integer::from(1u32);
        let mut term = Integer::from(1u32);
        loop {
            self.cofactor /= p_u64;
            pk = pk.checked_mul(p_u64).expect("prime power overflow in extract_big");
            term *= p_u64;
            sigma += &term;
            mult += 1;
            if self.cofactor % p_u64 != 0 {
                break;
            }
        }
        self.factored *= pk as u128;
        self.presum *= sigma;
        self.factors.push((p_u64, mult));
    }

    /// `true` once `cofactor` has been reduced to 1.
    #[inline]
    pub fn fully_factored(&self) -> bool {
        self.cofactor == 1
    }

    /// `presum >= factored`: the extracted part alone already has
    /// `sigma/product >= 2`, meaning `n` has an abundant proper factor and
    /// must be disqualified regardless of what remains in `cofactor`.
    #[inline]
    pub fn extracted_part_already_abundant(&self) -> bool {
        self.presum >= self.factored
    }

    /// Final verdict once `cofactor == 1`: `n` is abundant iff
    /// `presum > 2n`.
    pub fn is_abundant(&self) -> bool {
        debug_assert!(self.fully_factored());
        self.presum > Integer::from(self.n) * 2u32
    }
}
