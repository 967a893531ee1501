//! # Error — Fatal Error Types
//!
//! Fatal conditions that abort the whole search: a `D`-overflow in the
//! strong Lucas–Selfridge search, or Pollard-Rho exhausting its retry
//! budget on a stage-E cofactor (spec.md §7: "Pollard-Rho fails to
//! converge | Retry with incremented c; bounded retries then abort with
//! diagnostic"). Both propagate out of [`crate::pipeline::full_factor`]
//! through [`crate::search::Driver::check_candidate`] via `.map_err(Fatal::from)?`,
//! ending the whole search rather than skipping one `N`. Per-candidate
//! conditions that only skip one `N` (too many divisors, abundance excess
//! overflow) are NOT fatal and never reach here — the driver matches those
//! out of [`crate::divisors::Error`]/`Integer::to_u64()` directly and logs
//! them to `res.txt`. Missing/malformed input files are reported inline at
//! their I/O boundary (`io.rs`, `checkpoint.rs`) via `anyhow::Context`,
//! since `main` already wraps the whole entry point in `anyhow::Result`
//! and there is nothing else in the crate that needs to match on them
//! structurally.

#[derive(Debug, thiserror::Error)]
pub enum Fatal {
    #[error(transparent)]
    LucasDOverflow(#[from] crate::lucas::DOverflow),

    #[error("Pollard-Rho exhausted its retry budget on a cofactor of {n} (tried c up to {attempts})")]
    RhoExhausted { n: u64, attempts: u64 },
}

impl From<crate::pipeline::Error> for Fatal {
    fn from(e: crate::pipeline::Error) -> Self {
        match e {
            crate::pipeline::Error::RhoExhausted { n, attempts } => Fatal::RhoExhausted { n, attempts },
            crate::pipeline::Error::Lucas(inner) => Fatal::LucasDOverflow(inner),
        }
    }
}
