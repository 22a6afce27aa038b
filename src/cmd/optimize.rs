use crate::reports::{self, OutputFormat};
use cardforge::api::Session;
use cardforge::config::Config;
use cardforge::error::CfResult;
use cardforge::optimizer::runner::{ProgressCallback, RunOutcome, RunResult};
use cardforge::sink::{CombinationSink, JsonLinesSink};
use clap::Args;
use std::fs::OpenOptions;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Also list the top N distinct solutions found across runs.
    #[arg(long, default_value_t = 0)]
    pub top: usize,

    /// Appends the best sequence as a JSON line for the submission client.
    #[arg(long)]
    pub emit: Option<String>,
}

struct RunLogger;

impl ProgressCallback for RunLogger {
    fn on_run_complete(&self, result: &RunResult) -> bool {
        match &result.outcome {
            RunOutcome::Found(c) => info!(
                "Run {:3} | best {:5} | [{}]",
                result.run, c.evaluation.score, c.combination
            ),
            RunOutcome::NoGain { best_score } => {
                info!("Run {:3} | no gain (best {})", result.run, best_score)
            }
            RunOutcome::Exhausted => info!("Run {:3} | no valid start", result.run),
        }
        true
    }
}

pub fn run(args: &OptimizeArgs, session: &Session) -> CfResult<()> {
    let result = session.optimize_with(args.seed, RunLogger);

    if args.top > 0 && args.format == OutputFormat::Table {
        reports::print_ranked(&result.pool.ranked(), args.top);
    }
    let stats = result.stats;
    let recommendations = result.pool.recommend();

    match args.format {
        OutputFormat::Table => {
            reports::print_recommendations(&recommendations);
            if let Some(best) = recommendations.first() {
                reports::print_step_trace(&best.sequence, &best.step_trace);
            }
            reports::print_session_stats(&stats);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        }
    }

    if let (Some(path), Some(best)) = (&args.emit, recommendations.first()) {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut sink = JsonLinesSink::new(file);
        sink.submit(best)?;
        info!("📤 Emitted sequence to {}", path);
    }
    Ok(())
}
