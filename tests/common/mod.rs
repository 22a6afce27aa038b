#![allow(dead_code)]

use cardforge::api::Session;
use cardforge::catalog::{BaselineState, CardCatalog, Combination};
use cardforge::config::Config;
use cardforge::evaluator::Evaluator;

pub const EXAMPLE_BASELINE: [i64; 8] = [30, 30, 0, 0, 2, 0, 0, 0];

pub fn catalog(cards: Vec<Vec<i64>>) -> CardCatalog {
    CardCatalog::from_records(cards, 8).unwrap()
}

pub fn session(cards: Vec<Vec<i64>>, baseline: &[i64], config: Config) -> Session {
    let catalog = catalog(cards);
    let baseline = BaselineState::from_raw(baseline, 8).unwrap();
    Session::new(catalog, baseline, config).unwrap()
}

/// Small search budget so tests stay fast.
pub fn quick_config(runs: usize, iterations: usize) -> Config {
    let mut config = Config::default();
    config.search.runs = runs;
    config.search.iterations = iterations;
    config
}

pub fn combo(ids: &[usize], evaluator: &Evaluator) -> Combination {
    Combination::checked(ids.to_vec(), evaluator.catalog()).unwrap()
}

/// A catalog with useful, harmful and mixed cards.
pub fn mixed_cards() -> Vec<Vec<i64>> {
    vec![
        vec![4, 2, 0, 0, 0, 0, 0, 0],
        vec![3, 3, 1, 0, 0, 0, 0, 0],
        vec![-6, 2, 4, 2, 0, 0, 0, 0],
        vec![0, -4, 3, 3, 1, 0, 0, 0],
        vec![2, 2, -1, 0, 0, 1, 0, 0],
        vec![-10, -10, 6, 6, 2, 3, 1, 0],
        vec![1, 1, 0, 0, 0, 0, 0, 0],
        vec![0, 0, 0, 0, -2, 2, 2, 1],
        vec![5, -3, 0, 0, 0, 0, 0, 0],
        vec![-40, 0, 0, 0, 0, 0, 0, 1],
    ]
}
