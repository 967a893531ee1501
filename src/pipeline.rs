//! # Pipeline — Ordered Early-Rejection Factoring
//!
//! Runs the factoring stages in increasing order of cost, short-circuiting
//! the instant a candidate is proved non-abundant, and fully factors the
//! few survivors. Stage letters match the component design: A (known
//! small factor), B (`trial_factor_small`), C (`trial_factor_batch`), D
//! (post-batch barrier), E (large factoring via BPSW + Pollard-Rho).

use rug::ops::Pow;
use rug::Integer;

use crate::bpsw;
use crate::candidate::CandidateState;
use crate::primes::PrimeTable;
use crate::residue::ResidueWheel;
use crate::rho;

/// Which of the trivially-known small factors the driver already
/// established divide `N` before calling into the pipeline (the residue
/// step that selected this `N` already knows this without trial division).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnownFactors {
    Three,
    Five,
    ThreeAndFive,
}

/// Retry cap for Pollard-Rho's polynomial offset `c` before giving up on a
/// cofactor and aborting with a diagnostic (stage E).
pub const RHO_MAX_C: u64 = 128;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Pollard-Rho failed to converge for a cofactor of {n} after {attempts} values of c")]
    RhoExhausted { n: u64, attempts: u64 },
    #[error(transparent)]
    Lucas(#[from] crate::lucas::DOverflow),
}

/// Run the full ordered pipeline on a freshly initialized `state`.
///
/// Returns `Ok(true)` iff `state.n` is abundant, with `state.factors` fully
/// populated (`state.cofactor == 1`). Returns `Ok(false)` as soon as any
/// stage proves abundance is impossible — `state.factors` may be partial in
/// that case and must not be relied on.
pub fn full_factor(
    state: &mut CandidateState,
    wheel: &ResidueWheel,
    table: &PrimeTable,
    known: KnownFactors,
) -> Result<bool, Error> {
    // Stage A.
    match known {
        KnownFactors::Three => state.extract(3),
        KnownFactors::Five => state.extract(5),
        KnownFactors::ThreeAndFive => {
            state.extract(3);
            state.extract(5);
        }
    }

    // Stage B.
    if !trial_factor_small(state, wheel, table) {
        return Ok(false);
    }
    if state.fully_factored() {
        return Ok(state.is_abundant());
    }

    // Stage C.
    if !trial_factor_batch(state, table) {
        return Ok(false);
    }
    if state.fully_factored() {
        return Ok(state.is_abundant());
    }

    // Stage D.
    if (state.cofactor as u128) < table.prime_barrier as u128 {
        state.extract(state.cofactor);
        return Ok(state.is_abundant());
    }

    // Stage E.
    large_factor(state)
}

/// Stage B: trial-divide the first `INITIAL_SEG` table primes where the
/// residue wheel says they divide `N`, with the `presum >= factored`
/// early-out after every extraction.
fn trial_factor_small(state: &mut CandidateState, wheel: &ResidueWheel, table: &PrimeTable) -> bool {
    if state.fully_factored() {
        return true;
    }
    if state.extracted_part_already_abundant() {
        return false;
    }
    for i in 0..crate::primes::INITIAL_SEG {
        if wheel.divisible(i) {
            state.extract(table.primes[i]);
            if state.fully_factored() {
                return true;
            }
            if state.extracted_part_already_abundant() {
                return false;
            }
        }
    }
    true
}

/// Stage C: for each batch of table primes, apply the big-formula upper
/// bound sieve, then a batched GCD; on a nontrivial GCD, identify whether
/// it is a single prime, a product of two primes (Fermat's method), or
/// more (fall back to sequential trial division within the batch).
fn trial_factor_batch(state: &mut CandidateState, table: &PrimeTable) -> bool {
    if state.fully_factored() {
        return true;
    }
    for k in 0..table.num_batches() {
        if !big_formula_sieve_survives(state, table, k) {
            return false;
        }

        let cofactor_big = Integer::from(state.cofactor);
        let gcd = cofactor_big.gcd(&table.batch[k]);
        if gcd == 1u32 {
            continue;
        }

        let batch_hi = table.primes[crate::primes::INITIAL_SEG - 1 + (k + 1) * crate::primes::BATCH_LEN_1];
        if gcd <= batch_hi {
            let p = gcd.to_u64().expect("single-prime batch factor must fit u64");
            state.extract(p);
        } else if gcd <= Integer::from(batch_hi) * batch_hi {
            // Exactly two primes in this batch share `cofactor` — Fermat's method.
            let (p, q) = fermat_factor(&gcd);
            state.extract(p.to_u64().expect("batch factor must fit u64"));
            state.extract(q.to_u64().expect("batch factor must fit u64"));
        } else {
            // Three or more primes collided in one GCD: fall back to sequential
            // trial division by every prime in this batch.
            let lo = crate::primes::INITIAL_SEG + k * crate::primes::BATCH_LEN_1;
            let hi = lo + crate::primes::BATCH_LEN_1;
            for &p in &table.primes[lo..hi] {
                if state.cofactor % p == 0 {
                    state.extract(p);
                }
            }
        }

        if state.fully_factored() {
            return true;
        }
        if !abundance_still_possible(state) {
            return false;
        }
    }
    true
}

/// `true` iff the accumulated `presum` could still reach `2 * n` given the
/// remaining `cofactor`: `presum >= factored` (the extracted part alone is
/// already abundant) rules it out regardless of what the cofactor turns out
/// to be. Run after every extraction in stages C and E.
fn abundance_still_possible(state: &CandidateState) -> bool {
    state.cofactor == 1 || !state.extracted_part_already_abundant()
}

/// The "big formula" upper-bound sieve: with every prime below
/// `table.batch_lower_bound(k)` already ruled out, the best-case remaining
/// contribution to `sigma(N)` occurs if the cofactor is a pure power of the
/// smallest prime still possible. Reject if even that best case cannot
/// clear `2N`.
fn big_formula_sieve_survives(state: &CandidateState, table: &PrimeTable, k: usize) -> bool {
    let p_lo = table.batch_lower_bound(k);
    let cofactor = Integer::from(state.cofactor);

    // Smallest e with p_lo^e >= cofactor, tracking (p_lo - 1)^e alongside —
    // the maximal achievable sigma(p_lo^e) numerator if cofactor turned out
    // to be exactly that power of the smallest remaining prime.
    let mut power = Integer::from(p_lo);
    let mut shifted_power = Integer::from(p_lo - 1);
    while power < cofactor {
        power *= p_lo;
        shifted_power *= p_lo - 1;
    }

    // Survives iff presum * cofactor * p_lo^e > 2 * n * (p_lo - 1)^e; the
    // best case for abundance is cofactor == p_lo^e exactly, giving
    // sigma(cofactor) == (p_lo^(e+1) - 1)/(p_lo - 1) ~= p_lo^e * p_lo/(p_lo-1).
    let lhs = state.presum.clone() * &cofactor * &power;
    let rhs = Integer::from(state.n) * 2u32 * &shifted_power;
    lhs > rhs
}

/// Fermat's method: given `g = p*q` with `p, q` both odd primes, find `t`
/// with `t^2 - g` a perfect square, parity-matched to `g mod 4`.
fn fermat_factor(g: &Integer) -> (Integer, Integer) {
    let mut t = Integer::from(g.clone().sqrt()) + 1u32;
    let want_even = g.clone() % 4u32 == 1u32;
    if want_even != (t.is_even()) {
        t += 1u32;
    }
    loop {
        let t2_minus_g = Integer::from(&t * &t) - g;
        if t2_minus_g.clone().is_perfect_square() {
            let root = t2_minus_g.sqrt();
            let p = Integer::from(&t - &root);
            let q = Integer::from(&t + &root);
            return (p, q);
        }
        t += 2u32;
    }
}

/// Stage E: repeatedly factor out the largest remaining prime from
/// `cofactor` via BPSW (if it's already prime) or Pollard-Rho (Brent
/// variant, retried with incremented `c` on non-convergence, up to
/// [`RHO_MAX_C`]).
fn large_factor(state: &mut CandidateState) -> Result<bool, Error> {
    while state.cofactor != 1 {
        let cofactor_big = Integer::from(state.cofactor);
        if bpsw::is_probable_prime(&cofactor_big)? {
            state.extract(state.cofactor);
            break;
        }

        let mut c = 1u64;
        let factor = loop {
            if c > RHO_MAX_C {
                return Err(Error::RhoExhausted { n: state.n, attempts: c });
            }
            if let Some(f) = rho::find_factor(&cofactor_big, c) {
                break f;
            }
            c += 1;
        };
        let factor_u64 = factor.to_u64().expect("stage E factors must fit u64 for this search's N bound");
        state.extract(factor_u64);

        if !abundance_still_possible(state) {
            return Ok(false);
        }
    }
    Ok(state.is_abundant())
}
