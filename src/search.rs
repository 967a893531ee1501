//! # Search — The 30-Residue Wheel Driver
//!
//! Walks `N` through `[lb, ub)` seven steps per block of 30, visiting only
//! the residues divisible by 3 or 5 (the eight residues coprime to 30 are
//! never visited at all — no abundant number below any feasible search
//! bound is coprime to both 3 and 5, per OEIS A047802/A114809). Two of the
//! seven residues (5 and 25 mod 30, divisible by 5 but not 3) are further
//! gated behind `7 | N` (A114809), matching the reference driver's
//! `congruence[0] == 0` checks.
//!
//! For each surviving candidate: run the factoring pipeline; on abundance,
//! generate divisors bounded by the abundance excess and attempt the
//! subset-sum witness search; report a weird number, a too-many-divisors
//! skip, or an excess-overflow skip to `res.txt` as appropriate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rug::Integer;

use crate::candidate::CandidateState;
use crate::checkpoint::Checkpoint;
use crate::divisors;
use crate::error::Fatal;
use crate::io;
use crate::pipeline::{self, KnownFactors};
use crate::primes::PrimeTable;
use crate::progress::Progress;
use crate::residue::ResidueWheel;
use crate::subset_sum::{self, Checksum};

/// One step of the 30-wheel: how far to advance `N`, and what the driver
/// already knows divides it (or `None` if that's gated behind `7 | N`).
#[derive(Clone, Copy)]
struct Step {
    delta: u64,
    known: Option<KnownFactors>,
    gate_on_seven: bool,
}

/// The seven steps of a block of 30, starting from a residue-27 (`-3 mod
/// 30`) candidate: deltas 6,2,4,6,6,4,2 landing on residues 3,5,9,15,21,25,27.
const STEPS: [Step; 7] = [
    Step { delta: 6, known: Some(KnownFactors::Three), gate_on_seven: false }, // residue 3
    Step { delta: 2, known: Some(KnownFactors::Five), gate_on_seven: true },  // residue 5
    Step { delta: 4, known: Some(KnownFactors::Three), gate_on_seven: false }, // residue 9
    Step { delta: 6, known: Some(KnownFactors::ThreeAndFive), gate_on_seven: false }, // residue 15
    Step { delta: 6, known: Some(KnownFactors::Three), gate_on_seven: false }, // residue 21
    Step { delta: 4, known: Some(KnownFactors::Five), gate_on_seven: true },  // residue 25
    Step { delta: 2, known: Some(KnownFactors::Three), gate_on_seven: false }, // residue 27
];

/// The first block's steps when starting a sub-range from scratch (no
/// checkpoint): the usual cycle assumes `N` trails off a previous block's
/// residue 27, reaching residue 3 via a delta of 6 — but at the very start
/// of `[lb, ub)` there is no previous block, so the first candidate (residue
/// 3) is reached directly from `lb` with a delta of 3.
const FRESH_START_STEPS: [Step; 7] = [
    Step { delta: 3, known: Some(KnownFactors::Three), gate_on_seven: false },
    STEPS[1],
    STEPS[2],
    STEPS[3],
    STEPS[4],
    STEPS[5],
    STEPS[6],
];

/// Default checkpoint (and progress-print) cadence, in candidates actually
/// examined. Overridable per [`SearchConfig::checkpoint_interval`].
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 50_000_000;

pub struct SearchConfig {
    pub lb: u64,
    pub ub: u64,
    pub result_path: PathBuf,
    pub checkpoint_path: PathBuf,
    pub checkpoint_interval: u64,
}

pub struct Driver {
    table: Arc<PrimeTable>,
    config: SearchConfig,
    progress: Arc<Progress>,
}

impl Driver {
    pub fn new(table: Arc<PrimeTable>, config: SearchConfig, progress: Arc<Progress>) -> Self {
        Driver { table, config, progress }
    }

    /// Run the search to completion (or until a fatal error), resuming from
    /// `ckpt.txt` if present.
    ///
    /// Unlike the reference driver (which re-runs a fixed iteration count
    /// derived from the original `[lb, ub)` regardless of where `ckpt.txt`
    /// resumes from — effectively shifting the window past `ub` on any
    /// resumed run), this loop is bounded directly by `n < ub`: resuming
    /// picks up exactly where the last run left off and still stops at the
    /// configured upper bound.
    ///
    /// Checkpoints are only ever written at a block boundary (`N` sitting at
    /// residue 27, immediately after a full cycle of [`STEPS`] completes):
    /// resuming always restarts the cycle at its first step, which is only
    /// correct if the loaded `N` is exactly where a previous cycle left off.
    pub fn run(&mut self) -> Result<()> {
        let resume = Checkpoint::load(&self.config.checkpoint_path).context("loading checkpoint")?;
        let (mut n, mut checksum, fresh_start) = match resume {
            Some(c) => (c.n, Checksum(c.checksum), false),
            None => (self.config.lb, Checksum(0), true),
        };

        let mut wheel = ResidueWheel::init(&self.table, n);
        let mut since_checkpoint: u64 = 0;

        if fresh_start {
            self.run_block(&FRESH_START_STEPS, &mut n, &mut wheel, &mut checksum, &mut since_checkpoint)?;
        }

        while n < self.config.ub {
            let before = n;
            self.run_block(&STEPS, &mut n, &mut wheel, &mut checksum, &mut since_checkpoint)?;
            if since_checkpoint >= self.config.checkpoint_interval {
                since_checkpoint = 0;
                Checkpoint { n, checksum: checksum.0 }.save(&self.config.checkpoint_path)?;
                self.progress.print_status();
            }
            if n == before {
                // Every step in this cycle would have reached `ub`; nothing
                // left to visit in this sub-range.
                break;
            }
        }

        Checkpoint { n, checksum: checksum.0 }.save(&self.config.checkpoint_path)?;
        Ok(())
    }

    /// Run one cycle of `steps`, stopping without mutating `n`/`wheel` the
    /// instant the next candidate would reach `ub` — so a checkpoint taken
    /// right after this call is always either a clean block boundary or the
    /// final state of a fully completed search.
    fn run_block(
        &self,
        steps: &[Step; 7],
        n: &mut u64,
        wheel: &mut ResidueWheel,
        checksum: &mut Checksum,
        since_checkpoint: &mut u64,
    ) -> Result<()> {
        for step in steps {
            let next = *n + step.delta;
            if next >= self.config.ub {
                break;
            }
            *n = next;
            wheel.advance(&self.table, step.delta);
            self.progress.visited.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            *self.progress.current.lock().unwrap() = *n;

            let Some(known) = step.known else { continue };
            if step.gate_on_seven && !wheel.divisible(0) {
                continue;
            }

            self.check_candidate(*n, known, wheel, checksum)?;

            self.progress.checked.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            *since_checkpoint += 1;
        }
        Ok(())
    }

    fn check_candidate(
        &self,
        n: u64,
        known: KnownFactors,
        wheel: &ResidueWheel,
        checksum: &mut Checksum,
    ) -> Result<()> {
        let mut state = CandidateState::new(n);
        let abundant = pipeline::full_factor(&mut state, wheel, &self.table, known).map_err(Fatal::from)?;
        if !abundant {
            return Ok(());
        }

        let n_doubled = Integer::from(n) * 2u32;
        let excess_big = state.presum.clone() - n_doubled;
        let Some(excess) = excess_big.to_u64() else {
            io::append_result(&self.config.result_path, &format!("Error on {n}!!!"))?;
            return Ok(());
        };

        let divs = match divisors::generate(&state.factors, n, excess) {
            Ok(d) => d,
            Err(divisors::Error::TooManyDivisors { .. }) => {
                io::append_result(&self.config.result_path, &format!("{n}: too many divisors"))?;
                return Ok(());
            }
        };

        if !subset_sum::has_subset_summing_to(&divs, excess, checksum) {
            self.progress.weird_found.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            io::append_result(&self.config.result_path, &format!("{n} is WEIRD ODD!!!"))?;
        }
        Ok(())
    }
}

/// Sanity check used by tests and the `check` CLI subcommand: the raw
/// abundance-excess computation and divisor/subset-sum search for a single
/// `n`, bypassing the wheel/checkpoint machinery entirely.
pub fn check_single(n: u64, table: &PrimeTable) -> Result<bool> {
    debug_assert!(n % 2 == 1, "odd weird numbers are odd by definition");
    let known = if n % 3 == 0 && n % 5 == 0 {
        KnownFactors::ThreeAndFive
    } else if n % 3 == 0 {
        KnownFactors::Three
    } else if n % 5 == 0 {
        KnownFactors::Five
    } else {
        anyhow::bail!("{n} is divisible by neither 3 nor 5; this driver never visits such residues")
    };
    let wheel = ResidueWheel::init(table, n);
    let mut state = CandidateState::new(n);
    let abundant = pipeline::full_factor(&mut state, &wheel, table, known).map_err(Fatal::from)?;
    if !abundant {
        return Ok(false);
    }
    let excess = (state.presum.clone() - Integer::from(n) * 2u32)
        .to_u64()
        .context("abundance excess does not fit in u64")?;
    let divs = divisors::generate(&state.factors, n, excess).context("divisor generation")?;
    let mut checksum = Checksum::default();
    Ok(!subset_sum::has_subset_summing_to(&divs, excess, &mut checksum))
}

/// Run the search over `[lb, ub)`, optionally partitioned across `threads`
/// disjoint sub-intervals — one worker per sub-interval, each with its own
/// checkpoint file. `threads <= 1`
/// runs the single-threaded [`Driver`] directly with no partitioning
/// overhead; `threads > 1` splits `[lb, ub)` into 30-aligned chunks and
/// runs one [`Driver`] per chunk inside a Rayon scope. `table` is read-only
/// shared across every partition; each partition gets its own mutable
/// candidate state by virtue of owning its own `Driver`.
pub fn run_multi(
    table: Arc<PrimeTable>,
    lb: u64,
    ub: u64,
    threads: usize,
    result_path: PathBuf,
    checkpoint_path: PathBuf,
    checkpoint_interval: u64,
    progress: Arc<Progress>,
) -> Result<()> {
    if threads <= 1 {
        let config = SearchConfig { lb, ub, result_path, checkpoint_path, checkpoint_interval };
        let mut driver = Driver::new(table, config, progress);
        return driver.run();
    }

    let partitions = partition_range(lb, ub, threads);
    let errors: std::sync::Mutex<Vec<anyhow::Error>> = std::sync::Mutex::new(Vec::new());

    rayon::scope(|scope| {
        for (i, (part_lb, part_ub)) in partitions.into_iter().enumerate() {
            let table = Arc::clone(&table);
            let progress = Arc::clone(&progress);
            let result_path = result_path.clone();
            let checkpoint_path = partition_checkpoint_path(&checkpoint_path, i);
            let errors = &errors;
            scope.spawn(move |_| {
                let config = SearchConfig {
                    lb: part_lb,
                    ub: part_ub,
                    result_path,
                    checkpoint_path,
                    checkpoint_interval,
                };
                let mut driver = Driver::new(table, config, progress);
                if let Err(e) = driver.run() {
                    errors.lock().unwrap().push(e);
                }
            });
        }
    });

    let mut errors = errors.into_inner().unwrap();
    match errors.pop() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Split `[lb, ub)` into at most `threads` disjoint sub-intervals, each
/// aligned to a multiple of 30 so every partition's checkpoint starts
/// exactly on a wheel boundary.
fn partition_range(lb: u64, ub: u64, threads: usize) -> Vec<(u64, u64)> {
    debug_assert!(lb % 30 == 0 && ub % 30 == 0, "range must already be 30-aligned");
    let span_blocks = (ub - lb) / 30;
    if span_blocks == 0 || threads <= 1 {
        return vec![(lb, ub)];
    }
    let threads = threads.min(span_blocks.max(1) as usize).max(1);
    let blocks_per = span_blocks / threads as u64;
    let remainder = span_blocks % threads as u64;

    let mut parts = Vec::with_capacity(threads);
    let mut cursor = lb;
    for i in 0..threads {
        let blocks = blocks_per + if (i as u64) < remainder { 1 } else { 0 };
        let next = cursor + blocks * 30;
        if blocks > 0 {
            parts.push((cursor, next));
        }
        cursor = next;
    }
    parts
}

/// Derive a per-partition checkpoint path by appending `.{index}` to the
/// configured checkpoint file name.
fn partition_checkpoint_path(base: &Path, index: usize) -> PathBuf {
    let mut name = base.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{index}"));
    base.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_sum_to_30() {
        let total: u64 = STEPS.iter().map(|s| s.delta).sum();
        assert_eq!(total, 30);
    }

    #[test]
    fn check_single_945_is_weird_false_has_witness() {
        let table = PrimeTable::generate();
        assert!(!check_single(945, &table).unwrap());
    }

    #[test]
    fn check_single_rejects_deficient_number() {
        let table = PrimeTable::generate();
        assert!(!check_single(21, &table).unwrap());
    }

    #[test]
    fn partition_range_covers_interval_with_no_gaps_or_overlap() {
        let parts = partition_range(0, 3000, 4);
        assert_eq!(parts.first().unwrap().0, 0);
        assert_eq!(parts.last().unwrap().1, 3000);
        for w in parts.windows(2) {
            assert_eq!(w[0].1, w[1].0);
        }
        for (lo, hi) in &parts {
            assert_eq!(lo % 30, 0);
            assert_eq!(hi % 30, 0);
        }
    }

    #[test]
    fn partition_range_single_thread_is_whole_range() {
        assert_eq!(partition_range(90, 9990, 1), vec![(90, 9990)]);
    }

    #[test]
    fn partition_range_never_exceeds_available_blocks() {
        // Only 2 blocks of 30 available; asking for 8 threads must not
        // produce empty partitions.
        let parts = partition_range(0, 60, 8);
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn partition_checkpoint_path_suffixes_file_name() {
        let base = PathBuf::from("ckpt.txt");
        assert_eq!(partition_checkpoint_path(&base, 3), PathBuf::from("ckpt.txt.3"));
    }
}
