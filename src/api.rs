use crate::catalog::{BaselineState, CardCatalog, Combination, RawCard};
use crate::config::Config;
use crate::error::{CardForgeError, CfResult};
use crate::evaluator::{Evaluation, Evaluator};
use crate::optimizer::runner::{
    NoProgress, OptimizationOptions, OptimizationResult, Optimizer, ProgressCallback,
};
use crate::pool::Recommendation;
use crate::snapshot::{GameSnapshot, StateSource};
use std::sync::Arc;
use tracing::info;

/// One optimization session: read-only inputs plus the session-scoped
/// evaluation cache. Drop it to discard the cache.
pub struct Session {
    config: Config,
    evaluator: Arc<Evaluator>,
}

impl Session {
    /// Fails fast on configuration problems, before any search iteration.
    pub fn new(catalog: CardCatalog, baseline: BaselineState, config: Config) -> CfResult<Self> {
        config.validate()?;
        if catalog.dims() != config.shape.dimensions {
            return Err(CardForgeError::Config(format!(
                "catalog was ingested with {} dims, config expects {}",
                catalog.dims(),
                config.shape.dimensions
            )));
        }
        let evaluator = Evaluator::new(Arc::new(catalog), baseline, config.rules)?;
        Ok(Self {
            config,
            evaluator: Arc::new(evaluator),
        })
    }

    pub fn from_snapshot(snapshot: GameSnapshot, config: Config) -> CfResult<Self> {
        config.validate()?;
        let (catalog, baseline) = snapshot.into_inputs(config.shape.dimensions)?;
        Self::new(catalog, baseline, config)
    }

    pub fn from_source<S: StateSource + ?Sized>(source: &S, config: Config) -> CfResult<Self> {
        Self::from_snapshot(source.fetch()?, config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &CardCatalog {
        self.evaluator.catalog()
    }

    pub fn baseline(&self) -> &BaselineState {
        self.evaluator.baseline()
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Evaluates a caller-supplied sequence of `slot_count` card ids.
    pub fn evaluate_ids(&self, ids: Vec<usize>) -> CfResult<Arc<Evaluation>> {
        if ids.len() != self.config.shape.slot_count {
            return Err(CardForgeError::Validation(format!(
                "sequence has {} cards, expected {}",
                ids.len(),
                self.config.shape.slot_count
            )));
        }
        let combination = Combination::checked(ids, self.catalog())?;
        Ok(self.evaluator.evaluate(&combination))
    }

    pub fn optimizer(&self) -> Optimizer {
        Optimizer::new(
            Arc::clone(&self.evaluator),
            OptimizationOptions::from(&self.config),
        )
    }

    pub fn optimize(&self, seed: Option<u64>) -> OptimizationResult {
        self.optimize_with(seed, NoProgress)
    }

    pub fn optimize_with<CB: ProgressCallback>(
        &self,
        seed: Option<u64>,
        callback: CB,
    ) -> OptimizationResult {
        self.optimizer().run(seed, callback)
    }
}

/// Service: ingest raw cards and a baseline, run a full session and return
/// the 0–2 ranked recommendations.
pub fn recommend<I, R>(
    cards: I,
    baseline: &[i64],
    config: Config,
    seed: Option<u64>,
) -> CfResult<Vec<Recommendation>>
where
    I: IntoIterator<Item = R>,
    R: Into<RawCard>,
{
    config.validate()?;
    let dims = config.shape.dimensions;
    let catalog = CardCatalog::from_records(cards, dims)?;
    let baseline = BaselineState::from_raw(baseline, dims)?;
    let session = Session::new(catalog, baseline, config)?;

    let result = session.optimize(seed);
    let recommendations = result.pool.recommend();
    if recommendations.is_empty() {
        info!("No viable combination found");
    }
    Ok(recommendations)
}
