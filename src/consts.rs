/// Number of attribute dimensions seen in live game data.
pub const DEFAULT_DIMENSIONS: usize = 8;

/// Number of program slots in one combination.
pub const DEFAULT_SLOT_COUNT: usize = 8;

/// Baseline used when a snapshot carries no `local` vector.
pub const DEFAULT_BASELINE: [i64; DEFAULT_DIMENSIONS] = [30, 30, 0, 0, 2, 0, 0, 0];

// === Annealing schedule ===
pub const DEFAULT_INITIAL_TEMPERATURE: f64 = 300.0;
pub const DEFAULT_COOLING_RATE: f64 = 0.92;
pub const DEFAULT_ITERATIONS: usize = 2000;
pub const DEFAULT_RUNS: usize = 20;

/// Lower bound on the temperature so `exp(delta / t)` never collapses.
pub const DEFAULT_TEMPERATURE_FLOOR: f64 = 0.01;

// === Neighborhood ===
pub const DEFAULT_PREFERRED_SUBRANGE_SIZE: usize = 6;
pub const DEFAULT_PREFERRED_SUBRANGE_BIAS: f64 = 0.7;
pub const DEFAULT_MAX_CHANGES: usize = 2;

// === Restarts ===
pub const DEFAULT_INIT_ATTEMPTS: usize = 100;
pub const DEFAULT_RESTART_ATTEMPTS: usize = 50;
pub const DEFAULT_RESTART_FROM_BEST_PROBABILITY: f64 = 0.3;
pub const DEFAULT_RESTART_TEMPERATURE_FACTOR: f64 = 0.5;

/// Stagnation limit is `iterations / STAGNATION_DIVISOR` (at least 1).
pub const STAGNATION_DIVISOR: usize = 10;

/// How often (in iterations) a run polls the session deadline.
pub const DEADLINE_POLL_INTERVAL: usize = 64;
