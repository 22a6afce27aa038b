use crate::consts::*;
use crate::error::{CardForgeError, CfResult};
use clap::{parser::ValueSource, ArgAction, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub shape: ProblemShape,
    #[command(flatten)]
    pub rules: EvaluationRules,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    // === Schedule ===
    #[arg(long, default_value_t = DEFAULT_INITIAL_TEMPERATURE)]
    pub initial_temperature: f64,
    #[arg(long, default_value_t = DEFAULT_COOLING_RATE)]
    pub cooling_rate: f64,
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE_FLOOR)]
    pub temperature_floor: f64,
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,
    #[arg(long, default_value_t = DEFAULT_RUNS)]
    pub runs: usize,

    // === Neighborhood ===
    // Ids below this bound are drawn with `preferred_subrange_bias`.
    // Only meaningful when the catalog is pre-sorted by desirability.
    #[arg(long, default_value_t = DEFAULT_PREFERRED_SUBRANGE_SIZE)]
    pub preferred_subrange_size: usize,
    #[arg(long, default_value_t = DEFAULT_PREFERRED_SUBRANGE_BIAS)]
    pub preferred_subrange_bias: f64,
    #[arg(long, default_value_t = DEFAULT_MAX_CHANGES)]
    pub max_changes: usize,

    // === Restarts ===
    #[arg(long, default_value_t = DEFAULT_INIT_ATTEMPTS)]
    pub init_attempts: usize,
    #[arg(long, default_value_t = DEFAULT_RESTART_ATTEMPTS)]
    pub restart_attempts: usize,
    #[arg(long, default_value_t = DEFAULT_RESTART_FROM_BEST_PROBABILITY)]
    pub restart_from_best_probability: f64,
    #[arg(long, default_value_t = DEFAULT_RESTART_TEMPERATURE_FACTOR)]
    pub restart_temperature_factor: f64,

    // === Execution ===
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub parallel: bool,
    #[arg(long)]
    pub time_limit_secs: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            initial_temperature: DEFAULT_INITIAL_TEMPERATURE,
            cooling_rate: DEFAULT_COOLING_RATE,
            temperature_floor: DEFAULT_TEMPERATURE_FLOOR,
            iterations: DEFAULT_ITERATIONS,
            runs: DEFAULT_RUNS,
            preferred_subrange_size: DEFAULT_PREFERRED_SUBRANGE_SIZE,
            preferred_subrange_bias: DEFAULT_PREFERRED_SUBRANGE_BIAS,
            max_changes: DEFAULT_MAX_CHANGES,
            init_attempts: DEFAULT_INIT_ATTEMPTS,
            restart_attempts: DEFAULT_RESTART_ATTEMPTS,
            restart_from_best_probability: DEFAULT_RESTART_FROM_BEST_PROBABILITY,
            restart_temperature_factor: DEFAULT_RESTART_TEMPERATURE_FACTOR,
            parallel: true,
            time_limit_secs: None,
        }
    }
}

impl SearchParams {
    /// Consecutive non-improving iterations before a restart fires.
    #[inline(always)]
    pub fn stagnation_limit(&self) -> usize {
        (self.iterations / STAGNATION_DIVISOR).max(1)
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }
}

#[derive(Args, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProblemShape {
    /// Attribute dimensions (D).
    #[arg(long, default_value_t = DEFAULT_DIMENSIONS)]
    pub dimensions: usize,
    /// Program slots per combination (L).
    #[arg(long, default_value_t = DEFAULT_SLOT_COUNT)]
    pub slot_count: usize,
}

impl Default for ProblemShape {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
            slot_count: DEFAULT_SLOT_COUNT,
        }
    }
}

#[derive(Args, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EvaluationRules {
    /// When false, a negative running total after any step invalidates the
    /// combination. The final state is always checked regardless.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub allow_intermediate_negative: bool,
}

impl Default for EvaluationRules {
    fn default() -> Self {
        Self {
            allow_intermediate_negative: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Rejects settings the search cannot run with. Called before any run starts.
    pub fn validate(&self) -> CfResult<()> {
        let s = &self.search;
        if self.shape.dimensions == 0 {
            return Err(CardForgeError::Config(
                "dimensions must be positive".to_string(),
            ));
        }
        if self.shape.slot_count == 0 {
            return Err(CardForgeError::Config(
                "slot_count must be positive".to_string(),
            ));
        }
        if !(s.initial_temperature.is_finite() && s.initial_temperature > 0.0) {
            return Err(CardForgeError::Config(format!(
                "initial_temperature must be finite and positive, got {}",
                s.initial_temperature
            )));
        }
        if !(s.cooling_rate > 0.0 && s.cooling_rate <= 1.0) {
            return Err(CardForgeError::Config(format!(
                "cooling_rate must be in (0, 1], got {}",
                s.cooling_rate
            )));
        }
        if !(s.temperature_floor.is_finite() && s.temperature_floor > 0.0) {
            return Err(CardForgeError::Config(format!(
                "temperature_floor must be finite and positive, got {}",
                s.temperature_floor
            )));
        }
        if s.max_changes == 0 {
            return Err(CardForgeError::Config(
                "max_changes must be at least 1".to_string(),
            ));
        }
        check_probability("preferred_subrange_bias", s.preferred_subrange_bias)?;
        check_probability(
            "restart_from_best_probability",
            s.restart_from_best_probability,
        )?;
        if !(s.restart_temperature_factor > 0.0 && s.restart_temperature_factor.is_finite()) {
            return Err(CardForgeError::Config(format!(
                "restart_temperature_factor must be positive, got {}",
                s.restart_temperature_factor
            )));
        }
        Ok(())
    }

    /// Overlays values the user typed on the command line onto `self`
    /// (typically loaded from a JSON file). Defaults never override file values.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($group:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$group.$field = cli.$group.$field.clone();
                }
            };
        }

        update_if_present!(search.initial_temperature);
        update_if_present!(search.cooling_rate);
        update_if_present!(search.temperature_floor);
        update_if_present!(search.iterations);
        update_if_present!(search.runs);
        update_if_present!(search.preferred_subrange_size);
        update_if_present!(search.preferred_subrange_bias);
        update_if_present!(search.max_changes);
        update_if_present!(search.init_attempts);
        update_if_present!(search.restart_attempts);
        update_if_present!(search.restart_from_best_probability);
        update_if_present!(search.restart_temperature_factor);
        update_if_present!(search.parallel);
        update_if_present!(search.time_limit_secs);

        update_if_present!(shape.dimensions);
        update_if_present!(shape.slot_count);

        update_if_present!(rules.allow_intermediate_negative);
    }
}

fn check_probability(name: &str, p: f64) -> CfResult<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(CardForgeError::Config(format!(
            "{} must be within [0, 1], got {}",
            name, p
        )))
    }
}

/// Parses a comma separated list of integers, e.g. `"30,30,0,0,2"`.
pub fn parse_i64_list(s: &str, name: &str) -> CfResult<Vec<i64>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<i64>().map_err(|_| {
                CardForgeError::Validation(format!("Invalid number '{}' in {}", p, name))
            })
        })
        .collect()
}

/// Parses a comma separated list of card ids, e.g. `"0,0,3,1"`.
pub fn parse_id_list(s: &str, name: &str) -> CfResult<Vec<usize>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<usize>().map_err(|_| {
                CardForgeError::Validation(format!("Invalid card id '{}' in {}", p, name))
            })
        })
        .collect()
}
