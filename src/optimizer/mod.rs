pub mod mutation;
pub mod runner;

use self::mutation::IdSampler;
use crate::catalog::Combination;
use crate::config::SearchParams;
use crate::evaluator::{Evaluation, Evaluator};
use fastrand::Rng;
use std::sync::Arc;

/// How a stagnation restart resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restart {
    /// Resumed from the run's best-so-far.
    FromBest,
    /// Resampled a fresh valid random start.
    Fresh,
    /// No valid start found within the attempt bound; the run should stop.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub accepted: bool,
    pub new_best: bool,
    pub restart: Option<Restart>,
    /// Temperature after cooling (and after a restart reset, if any).
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    pub iterations: usize,
    pub accepted: usize,
    pub improvements: usize,
    pub restarts: usize,
    pub final_temperature: f64,
}

/// A run's best valid combination together with its evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub combination: Combination,
    pub evaluation: Arc<Evaluation>,
}

/// Draws uniformly random combinations until one is valid.
///
/// Makes one initial draw plus up to `attempts` redraws.
pub fn draw_valid_start(
    rng: &mut Rng,
    evaluator: &Evaluator,
    slots: usize,
    attempts: usize,
) -> Option<Candidate> {
    let card_count = evaluator.catalog().len();
    for _ in 0..=attempts {
        let combination = mutation::random_combination(rng, card_count, slots);
        let evaluation = evaluator.evaluate(&combination);
        if evaluation.valid {
            return Some(Candidate {
                combination,
                evaluation,
            });
        }
    }
    None
}

/// State of one simulated-annealing run.
pub struct Annealer<'a> {
    evaluator: &'a Evaluator,
    params: &'a SearchParams,
    sampler: IdSampler,
    slots: usize,
    stagnation_limit: usize,

    pub rng: Rng,
    pub current: Candidate,
    pub best: Candidate,
    pub temperature: f64,
    pub stagnation: usize,
    pub stats: RunStats,
}

impl<'a> Annealer<'a> {
    /// Returns `None` when no valid start exists within `init_attempts`.
    pub fn new(
        evaluator: &'a Evaluator,
        params: &'a SearchParams,
        slots: usize,
        mut rng: Rng,
    ) -> Option<Self> {
        let start = draw_valid_start(&mut rng, evaluator, slots, params.init_attempts)?;
        let sampler = IdSampler::new(
            evaluator.catalog().len(),
            params.preferred_subrange_size,
            params.preferred_subrange_bias,
        );
        let temperature = params.initial_temperature.max(params.temperature_floor);

        Some(Self {
            evaluator,
            params,
            sampler,
            slots,
            stagnation_limit: params.stagnation_limit(),
            rng,
            best: start.clone(),
            current: start,
            temperature,
            stagnation: 0,
            stats: RunStats {
                final_temperature: temperature,
                ..RunStats::default()
            },
        })
    }

    #[inline(always)]
    fn accepts(&mut self, evaluation: &Evaluation) -> bool {
        // Invalid neighbors behave as a score of negative infinity.
        let Some(score) = evaluation.fitness() else {
            return false;
        };
        let delta = score.saturating_sub(self.current.evaluation.score);
        if delta > 0 {
            return true;
        }
        self.rng.f64() < (delta as f64 / self.temperature).exp()
    }

    pub fn step(&mut self) -> StepReport {
        let combination = mutation::neighbor(
            &mut self.rng,
            &self.current.combination,
            &self.sampler,
            self.params.max_changes,
        );
        let evaluation = self.evaluator.evaluate(&combination);
        self.stats.iterations += 1;

        let accepted = self.accepts(&evaluation);
        let mut new_best = false;

        if accepted {
            self.current = Candidate {
                combination,
                evaluation,
            };
            self.stats.accepted += 1;

            if self.current.evaluation.score > self.best.evaluation.score {
                self.best = self.current.clone();
                self.stagnation = 0;
                self.stats.improvements += 1;
                new_best = true;
            } else {
                self.stagnation += 1;
            }
        } else {
            self.stagnation += 1;
        }

        self.temperature = (self.temperature * self.params.cooling_rate)
            .max(self.params.temperature_floor);

        let restart = if self.stagnation >= self.stagnation_limit {
            Some(self.restart())
        } else {
            None
        };

        self.stats.final_temperature = self.temperature;
        StepReport {
            accepted,
            new_best,
            restart,
            temperature: self.temperature,
        }
    }

    fn restart(&mut self) -> Restart {
        let kind = if self.rng.f64() < self.params.restart_from_best_probability {
            self.current = self.best.clone();
            Restart::FromBest
        } else {
            match draw_valid_start(
                &mut self.rng,
                self.evaluator,
                self.slots,
                self.params.restart_attempts,
            ) {
                Some(start) => {
                    self.current = start;
                    Restart::Fresh
                }
                None => Restart::Exhausted,
            }
        };

        self.temperature = (self.params.initial_temperature
            * self.params.restart_temperature_factor)
            .max(self.params.temperature_floor);
        self.stagnation = 0;
        self.stats.restarts += 1;
        kind
    }

    #[inline(always)]
    pub fn best_score(&self) -> i64 {
        self.best.evaluation.score
    }

    /// The run's contribution to the pool: its best, if the score is positive.
    pub fn finish(self) -> (Option<Candidate>, RunStats) {
        let stats = self.stats;
        if self.best.evaluation.score > 0 {
            (Some(self.best), stats)
        } else {
            (None, stats)
        }
    }
}
