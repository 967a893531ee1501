//! # Divisors — Proper-Divisor Enumeration Bounded by a Target
//!
//! Generates every divisor of `N` (from its factorization) that is `<=
//! target`, sorted ascending, for the subset-sum witness search. Bounded by
//! [`DIVISOR_BOUND`]: a number with enough small prime factors (highly
//! composite abundant candidates) can have more divisors than fit in a
//! reasonable buffer, and the search treats that as "could not verify"
//! rather than silently truncating.
//!
//! The reference implementation's "remove N itself" step is dead code there
//! (a `divisors_cnt`/`divisor_cnt` identifier mismatch means the wrong
//! variable is decremented). That's a bug worth fixing, not reproducing:
//! here the removal is a plain `retain`/pop on the actual divisor list.

use crate::candidate::Factor;

/// Divisor-buffer capacity; generation reporting more than this is treated
/// as "too many divisors," not silently truncated.
pub const DIVISOR_BOUND: usize = 1 << 20;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("divisor count {count} exceeds DIVISOR_BOUND ({DIVISOR_BOUND})")]
    TooManyDivisors { count: u64 },
}

/// Enumerate the ascending proper divisors of `n` (whose factorization is
/// `factors`) that are `<= target`. `n` itself is excluded even if `target
/// >= n` (this can only arise for perfect `n`, which cannot be abundant).
pub fn generate(factors: &[Factor], n: u64, target: u64) -> Result<Vec<u64>, Error> {
    let divisor_count: u64 = factors
        .iter()
        .try_fold(1u64, |acc, &(_, k)| acc.checked_mul(k as u64 + 1))
        .unwrap_or(u64::MAX);
    if divisor_count > DIVISOR_BOUND as u64 {
        return Err(Error::TooManyDivisors { count: divisor_count });
    }

    let mut divisors: Vec<u64> = vec![1];
    for &(p, k) in factors {
        let existing_len = divisors.len();
        let mut power = p;
        for _ in 0..k {
            for i in 0..existing_len {
                if let Some(candidate) = divisors[i].checked_mul(power) {
                    if candidate <= target {
                        divisors.push(candidate);
                    }
                }
            }
            power = power.saturating_mul(p);
        }
    }

    divisors.retain(|&d| d != n);
    divisors.sort_unstable();
    Ok(divisors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisors_of_945_bounded_by_30() {
        // 945 = 3^3 * 5 * 7; proper divisors <= 30: 1,3,5,7,9,15,21,27
        let factors = [(3u64, 3u32), (5, 1), (7, 1)];
        let divs = generate(&factors, 945, 30).unwrap();
        assert_eq!(divs, vec![1, 3, 5, 7, 9, 15, 21, 27]);
    }

    #[test]
    fn excludes_n_itself_when_target_reaches_it() {
        // 6 = 2*3, all divisors including 6 itself are <= target=6.
        let factors = [(2u64, 1u32), (3, 1)];
        let divs = generate(&factors, 6, 6).unwrap();
        assert!(!divs.contains(&6));
        assert_eq!(divs, vec![1, 2, 3]);
    }

    #[test]
    fn too_many_divisors_is_reported() {
        // A number with 21 distinct prime factors has 2^21 > DIVISOR_BOUND divisors.
        let factors: Vec<Factor> = (0..21).map(|i| (7 + 2 * i as u64, 1u32)).collect();
        let n = 1u64; // n itself irrelevant to the count computation
        let err = generate(&factors, n, u64::MAX).unwrap_err();
        match err {
            Error::TooManyDivisors { count } => assert_eq!(count, 1 << 21),
        }
    }

    #[test]
    fn divisors_are_sorted_ascending() {
        let factors = [(3u64, 2u32), (7, 1)];
        let divs = generate(&factors, 1, 1000).unwrap();
        for w in divs.windows(2) {
            assert!(w[0] < w[1]);
        }
    }
}
