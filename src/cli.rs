//! # CLI — Argument Parsing and Subcommand Dispatch
//!
//! `clap` derive surface for the `weirdodd` binary: the `search` subcommand
//! runs the full driver over `[lb, ub)` read from `inp.txt`; `check` runs
//! the pipeline and witness search on one literal `N`, useful for spot
//! checks against known abundant or deficient numbers. File-path defaults
//! may be overridden by a `weirdodd.toml` config file, which in turn is
//! overridden by explicit CLI flags.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use weirdodd::io;
use weirdodd::primes::PrimeTable;
use weirdodd::progress::Progress;
use weirdodd::search::{self, DEFAULT_CHECKPOINT_INTERVAL};

#[derive(Parser)]
#[command(name = "weirdodd", about = "Brute-force search for odd weird numbers over a 64-bit interval")]
pub struct Cli {
    /// Path to a `weirdodd.toml` config file supplying defaults for any flag
    /// not given explicitly on the command line.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Structured logging format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Human, env = "LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search `[lb, ub)` (read from `inp.txt`) for odd weird numbers.
    Search {
        /// Path to the range file (two whitespace-separated integers: lb, ub).
        #[arg(long)]
        input: Option<PathBuf>,
        /// Path to the small-prime table (exactly 2064 ascending primes starting at 7).
        #[arg(long)]
        primes: Option<PathBuf>,
        /// Path to the resumable checkpoint file.
        #[arg(long)]
        checkpoint: Option<PathBuf>,
        /// Path to the append-only result log.
        #[arg(long)]
        results: Option<PathBuf>,
        /// Number of disjoint sub-intervals to search concurrently (1 = single-threaded).
        #[arg(long)]
        threads: Option<usize>,
        /// Candidates examined between checkpoint writes and progress prints.
        #[arg(long)]
        checkpoint_interval: Option<u64>,
    },
    /// Run the pipeline and witness search on a single literal `N` and
    /// print the verdict (diagnostic entry point, not part of a range search).
    Check {
        /// The odd integer to test. Must be divisible by 3 or 5 (the driver
        /// never visits any other residue mod 30).
        n: u64,
        /// Path to the small-prime table (exactly 2064 ascending primes starting at 7).
        #[arg(long)]
        primes: Option<PathBuf>,
    },
}

/// Optional `weirdodd.toml` overrides, all fields optional so an absent or
/// partially-specified file is fine. CLI flags always win over these.
#[derive(Default, Deserialize)]
struct FileConfig {
    input: Option<PathBuf>,
    primes: Option<PathBuf>,
    checkpoint: Option<PathBuf>,
    results: Option<PathBuf>,
    threads: Option<usize>,
    checkpoint_interval: Option<u64>,
}

impl FileConfig {
    fn load(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(FileConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Initialize the global tracing subscriber per `--log-format`/`LOG_FORMAT`.
pub fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt().json().with_target(false).init();
        }
        LogFormat::Human => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).with_target(false).init();
        }
    }
}

/// Configure the Rayon global thread pool. `None`/`Some(0)` leaves Rayon's
/// own default (all logical cores) in place.
pub fn configure_rayon(threads: Option<usize>) {
    let Some(n) = threads.filter(|&n| n > 0) else { return };
    if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
        tracing::warn!(error = %e, "could not configure rayon thread pool, using default");
    }
}

const DEFAULT_INPUT: &str = "inp.txt";
const DEFAULT_PRIMES: &str = "primes.txt";
const DEFAULT_CHECKPOINT: &str = "ckpt.txt";
const DEFAULT_RESULTS: &str = "res.txt";

pub fn run_search(cli: &Cli, args: &Command) -> Result<()> {
    let Command::Search { input, primes, checkpoint, results, threads, checkpoint_interval } = args else {
        unreachable!("run_search called with a non-Search command")
    };

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::load(std::path::Path::new("weirdodd.toml"))?,
    };

    let input_path = input.clone().or(file_config.input).unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));
    let primes_path = primes.clone().or(file_config.primes).unwrap_or_else(|| PathBuf::from(DEFAULT_PRIMES));
    let checkpoint_path =
        checkpoint.clone().or(file_config.checkpoint).unwrap_or_else(|| PathBuf::from(DEFAULT_CHECKPOINT));
    let results_path = results.clone().or(file_config.results).unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS));
    let threads = threads.or(file_config.threads).unwrap_or(1);
    let checkpoint_interval =
        checkpoint_interval.or(file_config.checkpoint_interval).unwrap_or(DEFAULT_CHECKPOINT_INTERVAL);

    configure_rayon(Some(threads));

    let (lb, ub) = io::load_range(&input_path)?;
    anyhow::ensure!(lb < ub, "empty or inverted range: lb={lb} ub={ub}");

    let table = Arc::new(PrimeTable::from_primes(io::load_primes(&primes_path)?));
    let progress = Progress::new();
    let reporter = progress.start_reporter();

    tracing::info!(lb, ub, threads, "starting search");
    let outcome = search::run_multi(
        table,
        lb,
        ub,
        threads,
        results_path,
        checkpoint_path,
        checkpoint_interval,
        Arc::clone(&progress),
    );
    progress.stop();
    let _ = reporter.join();
    outcome
}

pub fn run_check(args: &Command) -> Result<()> {
    let Command::Check { n, primes } = args else {
        unreachable!("run_check called with a non-Check command")
    };
    anyhow::ensure!(n % 2 == 1, "{n} is even; odd weird numbers are odd by definition");

    let primes_path = primes.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_PRIMES));
    let table = PrimeTable::from_primes(io::load_primes(&primes_path)?);

    let weird = search::check_single(*n, &table)?;
    if weird {
        println!("{n} is WEIRD ODD!!!");
    } else {
        println!("{n} is not weird");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_missing_file_is_all_none() {
        let cfg = FileConfig::load(std::path::Path::new("/nonexistent/weirdodd.toml")).unwrap();
        assert!(cfg.input.is_none());
        assert!(cfg.threads.is_none());
    }

    #[test]
    fn file_config_parses_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weirdodd.toml");
        std::fs::write(&path, "threads = 4\nresults = \"out.txt\"\n").unwrap();
        let cfg = FileConfig::load(&path).unwrap();
        assert_eq!(cfg.threads, Some(4));
        assert_eq!(cfg.results, Some(PathBuf::from("out.txt")));
        assert!(cfg.input.is_none());
    }
}
