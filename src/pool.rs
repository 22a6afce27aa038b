use crate::catalog::{AttributeVector, Combination};
use crate::evaluator::Evaluation;
use crate::optimizer::Candidate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, PartialEq)]
pub struct PoolEntry {
    pub combination: Combination,
    pub evaluation: Arc<Evaluation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// Highest score overall.
    BestScore,
    /// Highest score among solutions that lose nothing in any dimension.
    CleanGain,
}

/// One ranked output record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub sequence: Vec<usize>,
    pub final_state: AttributeVector,
    pub net_gain: AttributeVector,
    pub score: i64,
    pub step_trace: Vec<AttributeVector>,
}

impl Recommendation {
    fn from_entry(kind: RecommendationKind, entry: &PoolEntry) -> Self {
        let e = &entry.evaluation;
        Self {
            kind,
            sequence: entry.combination.ids().to_vec(),
            final_state: e.final_state.clone(),
            net_gain: e.net_gain.clone(),
            score: e.score,
            step_trace: e.step_trace.clone(),
        }
    }
}

/// Distinct per-run results of one session, in arrival order.
///
/// Entries are keyed by the exact ordered sequence: permutations of the same
/// multiset stay separate entries.
#[derive(Debug, Default)]
pub struct SolutionPool {
    entries: Vec<PoolEntry>,
    index: HashMap<Combination, usize>,
}

impl SolutionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a valid, positive-score result. Returns `false` for duplicates
    /// and for results that do not qualify.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        let e = &candidate.evaluation;
        if !e.valid || e.score <= 0 {
            return false;
        }
        if self.index.contains_key(&candidate.combination) {
            return false;
        }
        self.index
            .insert(candidate.combination.clone(), self.entries.len());
        self.entries.push(PoolEntry {
            combination: candidate.combination,
            evaluation: candidate.evaluation,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, combination: &Combination) -> bool {
        self.index.contains_key(combination)
    }

    /// All entries, score descending; equal scores keep arrival order.
    pub fn ranked(&self) -> Vec<&PoolEntry> {
        let mut out: Vec<&PoolEntry> = self.entries.iter().collect();
        out.sort_by(|a, b| b.evaluation.score.cmp(&a.evaluation.score));
        out
    }

    pub fn best_score(&self) -> Option<&PoolEntry> {
        self.ranked().into_iter().next()
    }

    pub fn best_clean_gain(&self) -> Option<&PoolEntry> {
        self.ranked()
            .into_iter()
            .find(|entry| entry.evaluation.is_clean_gain())
    }

    /// Final output: the best-score entry, followed by the best clean-gain
    /// entry when that is a different sequence. Empty pool, empty result.
    pub fn recommend(self) -> Vec<Recommendation> {
        let mut out = Vec::with_capacity(2);
        let Some(best) = self.best_score() else {
            return out;
        };
        out.push(Recommendation::from_entry(RecommendationKind::BestScore, best));

        if let Some(clean) = self.best_clean_gain() {
            if clean.combination != best.combination {
                out.push(Recommendation::from_entry(
                    RecommendationKind::CleanGain,
                    clean,
                ));
            }
        }
        out
    }
}
