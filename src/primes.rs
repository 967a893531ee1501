//! # Primes — Small-Prime Table and Batch Products
//!
//! Static, process-lifetime data used by every stage of the factoring
//! pipeline: the ordered list of the first [`PRIME_COUNT`] primes, grouped
//! into batches of [`BATCH_LEN_1`] for batched-GCD divisibility testing
//! (stage C of `pipeline`), plus the derived `prime_barrier`.
//!
//! ## Table content
//!
//! The table **excludes 2, 3, and 5** and starts at 7. The driver ([`crate::search`])
//! extracts factors of 3 and 5 itself before the table-driven stages ever run
//! (see `candidate::extract_three`/`extract_five`); including them here would
//! have `trial_factor_small` attempt to re-divide a cofactor that no longer
//! holds that factor. This is resolved against the reference implementation
//! (`fwjmath/weird-odd-engine`), which relies on `congruence[0]` testing
//! divisibility by 7 — only true if `primes[0] == 7`.

use rug::Integer;

/// Number of primes in the table (matches the reference implementation's
/// `PRIME_COUNT`). Excludes 2, 3, and 5.
pub const PRIME_COUNT: usize = 2064;

/// Size of the initial segment trial-divided one prime at a time before
/// batching kicks in.
pub const INITIAL_SEG: usize = 16;

/// Number of primes grouped into each batch product for batched-GCD testing.
pub const BATCH_LEN_1: usize = 32;

/// A process-lifetime, read-only table of small primes and their batch
/// products, used throughout the factoring pipeline.
pub struct PrimeTable {
    /// Ascending primes, `primes[0] == 7`, `primes.len() == PRIME_COUNT`.
    pub primes: Vec<u64>,
    /// `batch[k]` is the product of `primes[INITIAL_SEG + k*BATCH_LEN_1 .. INITIAL_SEG + (k+1)*BATCH_LEN_1)`.
    pub batch: Vec<Integer>,
    /// `primes[PRIME_COUNT - 1]^2` — cofactors below this surviving trial
    /// division are necessarily prime.
    pub prime_barrier: u64,
}

impl PrimeTable {
    /// Build the table by generating primes with a simple sieve, skipping
    /// 2, 3, and 5.
    pub fn generate() -> Self {
        // Generous upper bound: the 2064th prime after 5 is well under 25,000
        // (the 2070th prime overall is 18,041); double it for headroom.
        let mut limit: u64 = 40_000;
        let mut primes;
        loop {
            let all = sieve_primes(limit);
            primes = all
                .into_iter()
                .filter(|&p| p != 2 && p != 3 && p != 5)
                .take(PRIME_COUNT)
                .collect::<Vec<u64>>();
            if primes.len() == PRIME_COUNT {
                break;
            }
            limit *= 2;
        }
        Self::from_primes(primes)
    }

    /// Build the table from an externally supplied, already-filtered and
    /// ascending prime list of exactly `PRIME_COUNT` entries (the `primes.txt`
    /// loading path — see [`crate::io::load_primes`]).
    pub fn from_primes(primes: Vec<u64>) -> Self {
        assert_eq!(primes.len(), PRIME_COUNT, "prime table must have exactly {PRIME_COUNT} entries");

        let num_batches = (PRIME_COUNT - INITIAL_SEG) / BATCH_LEN_1;
        let mut batch = Vec::with_capacity(num_batches);
        for k in 0..num_batches {
            let start = INITIAL_SEG + k * BATCH_LEN_1;
            let end = start + BATCH_LEN_1;
            let mut product = Integer::from(1u32);
            for &p in &primes[start..end] {
                product *= p;
            }
            batch.push(product);
        }

        let last = *primes.last().unwrap();
        let prime_barrier = last.checked_mul(last).expect("prime_barrier overflow: last table prime too large");

        PrimeTable { primes, batch, prime_barrier }
    }

    /// Number of batches the table is grouped into.
    pub fn num_batches(&self) -> usize {
        self.batch.len()
    }

    /// Largest prime fully trial-divided up through batch `k` (exclusive of
    /// batch `k` itself) — `primes[INITIAL_SEG - 1 + k*BATCH_LEN_1]`.
    pub fn batch_lower_bound(&self, k: usize) -> u64 {
        self.primes[INITIAL_SEG - 1 + k * BATCH_LEN_1]
    }
}

/// Simple sieve of Eratosthenes returning ascending primes up to `limit`
/// inclusive. Only ever called at startup against a small limit (tens of
/// thousands), so a byte-per-candidate sieve is plenty fast.
fn sieve_primes(limit: u64) -> Vec<u64> {
    let limit = limit as usize;
    let mut is_composite = vec![false; limit + 1];
    let mut out = Vec::new();
    for n in 2..=limit {
        if !is_composite[n] {
            out.push(n as u64);
            if let Some(step) = n.checked_mul(n) {
                let mut m = step;
                while m <= limit {
                    is_composite[m] = true;
                    m += n;
                }
            }
        }
    }
    out
}
