use crate::catalog::{AttributeVector, BaselineState, CardCatalog, Combination};
use crate::config::EvaluationRules;
use crate::error::{CardForgeError, CfResult};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Full result of applying a combination to the baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub final_state: AttributeVector,
    pub net_gain: AttributeVector,
    pub score: i64,
    /// Running totals: the baseline first, then one entry per applied card.
    pub step_trace: Vec<AttributeVector>,
    pub valid: bool,
}

impl Evaluation {
    /// Score seen by the search: `None` for invalid combinations, which are
    /// never accepted.
    #[inline(always)]
    pub fn fitness(&self) -> Option<i64> {
        if self.valid {
            Some(self.score)
        } else {
            None
        }
    }

    /// True when no dimension lost value relative to the baseline.
    pub fn is_clean_gain(&self) -> bool {
        !self.net_gain.has_negative()
    }

    /// Step trace with negative running totals shown as zero.
    pub fn display_trace(&self) -> Vec<AttributeVector> {
        self.step_trace.iter().map(AttributeVector::clamped).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
}

/// Pure, memoized combination evaluator for one session.
///
/// The cache belongs to the evaluator instance, so two sessions never share
/// entries. Concurrent runs may race on the same key; both compute the same
/// value and the first insert wins.
pub struct Evaluator {
    catalog: Arc<CardCatalog>,
    baseline: BaselineState,
    rules: EvaluationRules,
    cache: RwLock<HashMap<Combination, Arc<Evaluation>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Evaluator {
    pub fn new(
        catalog: Arc<CardCatalog>,
        baseline: BaselineState,
        rules: EvaluationRules,
    ) -> CfResult<Self> {
        if baseline.dims() != catalog.dims() {
            return Err(CardForgeError::Validation(format!(
                "baseline has {} dims but catalog has {}",
                baseline.dims(),
                catalog.dims()
            )));
        }
        Ok(Self {
            catalog,
            baseline,
            rules,
            cache: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    pub fn baseline(&self) -> &BaselineState {
        &self.baseline
    }

    pub fn evaluate(&self, combination: &Combination) -> Arc<Evaluation> {
        if let Ok(cache) = self.cache.read() {
            if let Some(hit) = cache.get(combination) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Arc::clone(hit);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let fresh = Arc::new(self.compute(combination));

        match self.cache.write() {
            Ok(mut cache) => Arc::clone(
                cache
                    .entry(combination.clone())
                    .or_insert_with(|| Arc::clone(&fresh)),
            ),
            // A poisoned cache only loses memoization, never correctness.
            Err(_) => fresh,
        }
    }

    /// Uncached evaluation.
    ///
    /// Totals are accumulated in `i128`, so validity and score do not depend
    /// on card order even for extreme attribute values. A combination whose
    /// final state, net gain or score leaves the `i64` range is invalid;
    /// its reported vectors and trace saturate.
    pub fn compute(&self, combination: &Combination) -> Evaluation {
        let baseline = self.baseline.state();
        let mut running = baseline.clone();
        let mut totals: Vec<i128> = baseline
            .as_slice()
            .iter()
            .map(|&v| i128::from(v))
            .collect();
        let mut step_trace = Vec::with_capacity(combination.len() + 1);
        step_trace.push(running.clone());

        let mut valid = true;
        for &id in combination.ids() {
            let delta = &self.catalog.card(id).delta;
            running.add_assign(delta);
            for (t, &d) in totals.iter_mut().zip(delta.as_slice()) {
                *t += i128::from(d);
            }
            if !self.rules.allow_intermediate_negative && totals.iter().any(|&t| t < 0) {
                valid = false;
            }
            step_trace.push(running.clone());
        }

        let Some((final_state, net_gain, score)) = exact_outcome(&totals, baseline) else {
            debug!("Combination [{}] overflows the attribute range", combination);
            let net_gain = running.difference(baseline);
            let score = net_gain.sum();
            return Evaluation {
                final_state: running,
                net_gain,
                score,
                step_trace,
                valid: false,
            };
        };

        // Unconditional: the final state must never be negative.
        if final_state.has_negative() {
            valid = false;
        }

        Evaluation {
            final_state,
            net_gain,
            score,
            step_trace,
            valid,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        let len = self.cache.read().map(|c| c.len()).unwrap_or(0);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len,
        }
    }
}

/// Final state, net gain and score from exact totals, or `None` when any of
/// them does not fit in an `i64`.
fn exact_outcome(
    totals: &[i128],
    baseline: &AttributeVector,
) -> Option<(AttributeVector, AttributeVector, i64)> {
    let final_state = AttributeVector::try_from_wide(totals)?;
    let gains: Vec<i128> = totals
        .iter()
        .zip(baseline.as_slice())
        .map(|(&t, &b)| t - i128::from(b))
        .collect();
    let net_gain = AttributeVector::try_from_wide(&gains)?;
    let score = i64::try_from(gains.iter().sum::<i128>()).ok()?;
    Some((final_state, net_gain, score))
}
