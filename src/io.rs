//! # IO — `inp.txt` / `primes.txt` / `res.txt` File Formats
//!
//! The three flat-file formats this program speaks, per the external
//! interfaces: the search range, the precomputed small-prime table, and the
//! append-only result log. `ckpt.txt` has its own module, [`crate::checkpoint`].

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::primes::PRIME_COUNT;

/// Read and parse `inp.txt`: two whitespace-separated unsigned integers,
/// `lb` and `ub`, rounded down to the nearest multiple of 30 before return.
pub fn load_range(path: &Path) -> Result<(u64, u64)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading range file {}", path.display()))?;
    let mut fields = text.split_whitespace();
    let lb: u64 = fields
        .next()
        .context("inp.txt missing lower bound")?
        .parse()
        .context("inp.txt lower bound is not a valid integer")?;
    let ub: u64 = fields
        .next()
        .context("inp.txt missing upper bound")?
        .parse()
        .context("inp.txt upper bound is not a valid integer")?;
    Ok((lb - lb % 30, ub - ub % 30))
}

/// Read and parse `primes.txt`: exactly [`PRIME_COUNT`] whitespace-separated
/// ascending decimal primes, starting at 7 — matching
/// `original_source/trunk/weirdodd.cpp`'s `readTable()`, which reads exactly
/// `PRIME_COUNT` raw tokens straight into `primes[]` with no header or
/// filtering. The table excludes 2, 3, and 5 (see [`crate::primes`]'s module
/// doc): `congruence[0]` must test divisibility by 7, which only holds if
/// `primes[0] == 7`.
pub fn load_primes(path: &Path) -> Result<Vec<u64>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading prime table {}", path.display()))?;
    let all: Vec<u64> = text
        .split_whitespace()
        .map(|tok| tok.parse::<u64>().context("primes.txt contains a non-integer token"))
        .collect::<Result<_>>()?;
    anyhow::ensure!(
        all.len() == PRIME_COUNT,
        "primes.txt must contain exactly {PRIME_COUNT} primes, found {}",
        all.len()
    );
    Ok(all)
}

/// Append a line to `res.txt`, creating it if absent. Used for witness
/// lines (`<N> is WEIRD ODD!!!`) and non-fatal per-candidate skips.
pub fn append_result(path: &Path, line: &str) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening result log {}", path.display()))?;
    writeln!(file, "{line}").with_context(|| format!("writing to result log {}", path.display()))?;
    println!("{line}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_range_rounds_down_to_multiple_of_30() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inp.txt");
        fs::write(&path, "100 1000000031\n").unwrap();
        let (lb, ub) = load_range(&path).unwrap();
        assert_eq!(lb, 90);
        assert_eq!(ub, 1000000020);
    }

    #[test]
    fn load_primes_rejects_wrong_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("primes.txt");
        fs::write(&path, "7 11 13").unwrap();
        assert!(load_primes(&path).is_err());
    }

    #[test]
    fn load_primes_reads_table_starting_at_seven() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("primes.txt");
        let mut all = Vec::with_capacity(PRIME_COUNT);
        let mut p = 7u64;
        while all.len() < PRIME_COUNT {
            if is_prime(p) {
                all.push(p);
            }
            p += 2;
        }
        let text = all.iter().map(u64::to_string).collect::<Vec<_>>().join(" ");
        fs::write(&path, text).unwrap();
        let loaded = load_primes(&path).unwrap();
        assert_eq!(loaded.len(), PRIME_COUNT);
        assert_eq!(loaded[0], 7);
    }

    #[test]
    fn append_result_creates_and_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("res.txt");
        append_result(&path, "945 is WEIRD ODD!!!").unwrap();
        append_result(&path, "999 is WEIRD ODD!!!").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    fn is_prime(n: u64) -> bool {
        if n < 2 {
            return false;
        }
        let mut i = 2;
        while i * i <= n {
            if n % i == 0 {
                return false;
            }
            i += 1;
        }
        true
    }
}
