//! CLI integration tests for the `weirdodd` binary, driven via `assert_cmd`.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn weirdodd() -> Command {
    Command::cargo_bin("weirdodd").unwrap()
}

/// Build a `primes.txt` with the first `count` primes starting from 7
/// (excluding 2, 3, 5 — see `primes::PrimeTable`'s module doc for why).
fn write_primes_file(path: &std::path::Path, count: usize) {
    let mut primes = Vec::with_capacity(count);
    let mut p = 7u64;
    while primes.len() < count {
        if is_prime(p) {
            primes.push(p);
        }
        p += 1;
    }
    let text = primes.iter().map(u64::to_string).collect::<Vec<_>>().join(" ");
    fs::write(path, text).unwrap();
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut i = 2u64;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

#[test]
fn help_lists_search_and_check_subcommands() {
    weirdodd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn missing_range_file_is_a_clean_error() {
    let dir = tempdir().unwrap();
    weirdodd()
        .current_dir(&dir)
        .arg("search")
        .arg("--input")
        .arg("does-not-exist.txt")
        .assert()
        .failure();
}

#[test]
fn check_945_reports_not_weird() {
    let dir = tempdir().unwrap();
    let primes_path = dir.path().join("primes.txt");
    write_primes_file(&primes_path, weirdodd::primes::PRIME_COUNT);

    weirdodd()
        .arg("check")
        .arg("945")
        .arg("--primes")
        .arg(&primes_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("945 is not weird"));
}

#[test]
fn check_rejects_even_input() {
    let dir = tempdir().unwrap();
    let primes_path = dir.path().join("primes.txt");
    write_primes_file(&primes_path, weirdodd::primes::PRIME_COUNT);

    weirdodd()
        .arg("check")
        .arg("946")
        .arg("--primes")
        .arg(&primes_path)
        .assert()
        .failure();
}

#[test]
fn search_over_small_range_produces_no_weird_lines() {
    let dir = tempdir().unwrap();
    let primes_path = dir.path().join("primes.txt");
    write_primes_file(&primes_path, weirdodd::primes::PRIME_COUNT);
    let input_path = dir.path().join("inp.txt");
    fs::write(&input_path, "1 100000").unwrap();
    let results_path = dir.path().join("res.txt");
    let checkpoint_path = dir.path().join("ckpt.txt");

    weirdodd()
        .current_dir(&dir)
        .arg("search")
        .arg("--input")
        .arg(&input_path)
        .arg("--primes")
        .arg(&primes_path)
        .arg("--results")
        .arg(&results_path)
        .arg("--checkpoint")
        .arg(&checkpoint_path)
        .assert()
        .success();

    let results = fs::read_to_string(&results_path).unwrap_or_default();
    assert!(!results.contains("WEIRD ODD"));
    assert!(checkpoint_path.exists());
}
