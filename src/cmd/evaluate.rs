use crate::reports::{self, OutputFormat};
use cardforge::api::Session;
use cardforge::config::{parse_id_list, Config};
use cardforge::error::CfResult;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub config: Config,

    /// Comma separated card ids, e.g. "0,0,1,3,3,2,0,1".
    #[arg(short = 'q', long)]
    pub sequence: String,

    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Show running totals with negatives clamped to zero.
    #[arg(long, default_value_t = false)]
    pub clamp: bool,
}

pub fn run(args: &EvaluateArgs, session: &Session) -> CfResult<()> {
    let ids = parse_id_list(&args.sequence, "--sequence")?;
    let eval = session.evaluate_ids(ids.clone())?;

    match args.format {
        OutputFormat::Table => {
            if args.clamp {
                let mut shown = (*eval).clone();
                shown.step_trace = eval.display_trace();
                reports::print_evaluation(&ids, &shown);
            } else {
                reports::print_evaluation(&ids, &eval);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&*eval)?),
    }
    Ok(())
}
