//! # BPSW — Baillie–PSW Compositeness Test
//!
//! `is_probable_prime(n)` combines [`crate::miller::is_strong_probable_prime`]
//! at base 2 with [`crate::lucas::is_strong_probable_prime`]. No composite
//! passing both has ever been found, despite considerable search effort
//! (Baillie and Wagstaff's original paper offers a cash reward for a
//! counterexample). This is used as the final compositeness filter once a
//! cofactor has survived small-prime trial division and the batched-GCD
//! sieve (see [`crate::pipeline`]).

use rug::Integer;

use crate::lucas;
use crate::miller;

/// Errors surfaced from the strong Lucas–Selfridge stage.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    LucasDOverflow(#[from] lucas::DOverflow),
}

/// `true` if `n` is prime or a BPSW pseudoprime, `false` if definitely
/// composite. `n` must be odd and `>= 3`; even/small inputs are the caller's
/// responsibility (the pipeline never calls this until those are ruled out).
pub fn is_probable_prime(n: &Integer) -> Result<bool, Error> {
    debug_assert!(*n >= 3u32, "bpsw requires n >= 3");
    debug_assert!(n.is_odd(), "bpsw requires odd n");

    if !miller::is_strong_probable_prime(n, 2) {
        return Ok(false);
    }
    Ok(lucas::is_strong_probable_prime(n)?)
}
