//! # Rho — Pollard's Rho Factoring (Brent Variant)
//!
//! Finds a nontrivial factor of a composite `n` using the `x -> x^2 + c`
//! pseudorandom map with Brent's tortoise/hare cycle-detection schedule and
//! batched GCD: rather than taking a GCD after every step, the algorithm
//! accumulates the running product of `|x - y|` values over
//! [`BRENT_PERIOD`] steps and takes a single GCD per batch, which roughly
//! halves total GCD cost versus the naive per-step version.
//!
//! If a batch's GCD collapses to `n` itself (multiple factors canceled out
//! together), the batch is rewound and replayed one step at a time, taking a
//! GCD after each, to isolate the actual collision point.
//!
//! The caller is expected to retry with an incremented polynomial offset `c`
//! on failure (see [`crate::pipeline`]); this module only explores a single
//! `c` per call and reports failure rather than looping on `c` itself.

use rug::Integer;

/// Number of steps accumulated into a single batched GCD.
pub const BRENT_PERIOD: u64 = 16;

/// Generous cap on the doubling-stage length `r`, guarding against a
/// pathological input that never converges for a given `c`. `n` is always
/// guaranteed composite and free of factors below `prime_barrier` by the
/// time this is called, so in practice a factor is found in well under this
/// many steps.
const MAX_STAGE: u64 = 1 << 24;

/// Attempt to find a nontrivial factor of composite `n` using Brent's
/// variant of Pollard's Rho with polynomial offset `c`.
///
/// Returns `Some(factor)` with `1 < factor < n` on success, `None` if this
/// `c` failed to converge (the batch GCD collapsed all the way to `n` even
/// after single-stepping, or the stage-length cap was hit) — the caller
/// should retry with `c + 1`.
pub fn find_factor(n: &Integer, c: u64) -> Option<Integer> {
    debug_assert!(*n > 1u32);
    let c = Integer::from(c);
    let f = |x: &Integer| -> Integer { (Integer::from(x * x) + &c) % n };

    let x0 = Integer::from(2u32);
    let mut y = x0.clone();
    let mut g = Integer::from(1u32);
    let mut r: u64 = 1;
    let mut q = Integer::from(1u32);
    let mut x;
    let mut ys = y.clone();

    while g == 1u32 {
        x = y.clone();
        for _ in 0..r {
            y = f(&y);
        }

        let mut k = 0u64;
        while k < r && g == 1u32 {
            ys = y.clone();
            let batch = BRENT_PERIOD.min(r - k);
            for _ in 0..batch {
                y = f(&y);
                let diff = Integer::from(&x - &y).abs();
                q = (q * diff) % n;
            }
            g = q.clone().gcd(n);
            k += batch;
        }

        r *= 2;
        if r > MAX_STAGE {
            return None;
        }
    }

    if g == *n {
        // Rewind: replay from the last pre-batch snapshot one step at a
        // time, taking a GCD after each, to isolate the collision the
        // batched product smeared together.
        loop {
            ys = f(&ys);
            let diff = Integer::from(&x - &ys).abs();
            g = diff.gcd(n);
            if g > 1u32 {
                break;
            }
        }
    }

    if g > 1u32 && g < *n {
        Some(g)
    } else {
        None
    }
}
