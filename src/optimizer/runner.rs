use crate::config::{Config, SearchParams};
use crate::consts::DEADLINE_POLL_INTERVAL;
use crate::evaluator::{CacheStats, Evaluator};
use crate::optimizer::{Annealer, Candidate, Restart, RunStats};
use crate::pool::SolutionPool;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct OptimizationOptions {
    pub params: SearchParams,
    pub slot_count: usize,
}

impl From<&Config> for OptimizationOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            params: cfg.search.clone(),
            slot_count: cfg.shape.slot_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Best-so-far had a positive score and goes to the pool.
    Found(Candidate),
    /// The run searched but never found a positive score.
    NoGain { best_score: i64 },
    /// No valid random start within the attempt bound.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub run: usize,
    pub outcome: RunOutcome,
    pub stats: RunStats,
    /// Stopped by the deadline or an abort before using its iteration budget.
    pub cut_short: bool,
}

impl RunResult {
    pub fn best_score(&self) -> Option<i64> {
        match &self.outcome {
            RunOutcome::Found(c) => Some(c.evaluation.score),
            RunOutcome::NoGain { best_score } => Some(*best_score),
            RunOutcome::Exhausted => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionStats {
    pub runs_completed: usize,
    pub runs_found: usize,
    pub runs_no_gain: usize,
    pub runs_exhausted: usize,
    pub iterations: usize,
    pub accepted: usize,
    pub restarts: usize,
    pub deadline_hit: bool,
    pub aborted: bool,
    pub cache: CacheStats,
    pub elapsed: Duration,
}

pub struct OptimizationResult {
    pub pool: SolutionPool,
    pub runs: Vec<RunResult>,
    pub stats: SessionStats,
}

/// A trait for receiving updates as runs finish.
/// Boolean return value indicates if the search should continue (true) or abort (false).
pub trait ProgressCallback: Send + Sync {
    fn on_run_complete(&self, result: &RunResult) -> bool;
}

/// Callback that never interrupts the session.
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_run_complete(&self, _result: &RunResult) -> bool {
        true
    }
}

pub struct Optimizer {
    evaluator: Arc<Evaluator>,
    options: OptimizationOptions,
}

impl Optimizer {
    pub fn new(evaluator: Arc<Evaluator>, options: OptimizationOptions) -> Self {
        Self { evaluator, options }
    }

    pub fn run<CB: ProgressCallback>(&self, seed: Option<u64>, callback: CB) -> OptimizationResult {
        let opts = &self.options;
        let start_time = Instant::now();
        let deadline = opts.params.time_limit().map(|limit| start_time + limit);
        let abort = AtomicBool::new(false);

        info!(
            "🔥 Annealing: {} runs x {} iterations over {} cards (T0={}, cooling={})",
            opts.params.runs,
            opts.params.iterations,
            self.evaluator.catalog().len(),
            opts.params.initial_temperature,
            opts.params.cooling_rate
        );

        let execute = |run: usize| -> Option<RunResult> {
            if abort.load(Ordering::Relaxed) || past(deadline) {
                return None;
            }
            let result = self.run_single(run, seed, deadline, &abort);
            if !callback.on_run_complete(&result) {
                abort.store(true, Ordering::Relaxed);
            }
            Some(result)
        };

        // Results are collected in run order, so pool insertion order (and
        // with it tie-breaking) is the same for parallel and serial sessions.
        let results: Vec<RunResult> = if opts.params.parallel {
            (0..opts.params.runs)
                .into_par_iter()
                .filter_map(execute)
                .collect()
        } else {
            (0..opts.params.runs).filter_map(execute).collect()
        };

        let mut pool = SolutionPool::new();
        let mut stats = SessionStats {
            deadline_hit: past(deadline),
            aborted: abort.load(Ordering::Relaxed),
            ..SessionStats::default()
        };

        for result in &results {
            stats.runs_completed += 1;
            stats.iterations += result.stats.iterations;
            stats.accepted += result.stats.accepted;
            stats.restarts += result.stats.restarts;
            match &result.outcome {
                RunOutcome::Found(candidate) => {
                    stats.runs_found += 1;
                    if !pool.insert(candidate.clone()) {
                        debug!(
                            "Run {} converged on an already pooled sequence [{}]",
                            result.run, candidate.combination
                        );
                    }
                }
                RunOutcome::NoGain { .. } => stats.runs_no_gain += 1,
                RunOutcome::Exhausted => stats.runs_exhausted += 1,
            }
        }

        stats.cache = self.evaluator.cache_stats();
        stats.elapsed = start_time.elapsed();

        if stats.runs_exhausted > 0 {
            warn!(
                "⚠️  {} run(s) found no valid starting combination",
                stats.runs_exhausted
            );
        }
        if stats.deadline_hit {
            warn!(
                "⏱️  Time limit reached after {} of {} runs; keeping partial results",
                stats.runs_completed, opts.params.runs
            );
        }
        info!(
            "🏁 {} distinct solution(s) from {} runs in {:.2?} (cache: {} entries, {} hits)",
            pool.len(),
            stats.runs_completed,
            stats.elapsed,
            stats.cache.len,
            stats.cache.hits
        );

        OptimizationResult {
            pool,
            runs: results,
            stats,
        }
    }

    /// One independent annealing run, Init through Done.
    pub fn run_single(
        &self,
        run: usize,
        seed: Option<u64>,
        deadline: Option<Instant>,
        abort: &AtomicBool,
    ) -> RunResult {
        let opts = &self.options;
        let rng = match seed {
            Some(s) => fastrand::Rng::with_seed(s.wrapping_add(run as u64)),
            None => fastrand::Rng::new(),
        };

        let Some(mut annealer) = Annealer::new(&self.evaluator, &opts.params, opts.slot_count, rng)
        else {
            debug!("Run {}: search exhausted before start", run);
            return RunResult {
                run,
                outcome: RunOutcome::Exhausted,
                stats: RunStats::default(),
                cut_short: false,
            };
        };

        let mut cut_short = false;
        for i in 0..opts.params.iterations {
            if i % DEADLINE_POLL_INTERVAL == 0
                && (abort.load(Ordering::Relaxed) || past(deadline))
            {
                cut_short = true;
                break;
            }
            let report = annealer.step();
            if report.restart == Some(Restart::Exhausted) {
                debug!(
                    "Run {}: no valid restart after {} iterations, stopping",
                    run,
                    i + 1
                );
                break;
            }
        }

        let best_score = annealer.best_score();
        let (best, stats) = annealer.finish();
        debug!(
            "Run {}: best {} | {} accepted | {} restarts | T={:.3}",
            run, best_score, stats.accepted, stats.restarts, stats.final_temperature
        );

        let outcome = match best {
            Some(candidate) => RunOutcome::Found(candidate),
            None => RunOutcome::NoGain { best_score },
        };
        RunResult {
            run,
            outcome,
            stats,
            cut_short,
        }
    }
}

#[inline(always)]
fn past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}
