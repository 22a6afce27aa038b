use cardforge::api::Session;
use cardforge::config::{parse_i64_list, Config};
use cardforge::error::CfResult;
use cardforge::snapshot::FileStateSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Account snapshot (JSON) or card list (CSV).
    #[arg(global = true, short, long, default_value = "data/snapshot.json")]
    snapshot: String,

    /// Overrides the snapshot's baseline, e.g. "30,30,0,0,2,0,0,0".
    #[arg(global = true, short, long)]
    baseline: Option<String>,

    /// JSON config file; flags given on the command line take precedence.
    #[arg(global = true, long = "config")]
    config_file: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for the best card combination.
    Optimize(cmd::optimize::OptimizeArgs),
    /// Score one explicit combination.
    Evaluate(cmd::evaluate::EvaluateArgs),
    /// Show the ingested catalog and baseline.
    Inspect(cmd::inspect::InspectArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli, &matches) {
        error!("❌ {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli, matches: &ArgMatches) -> CfResult<()> {
    // Arguments like --runs live inside the subcommand's matches, not the root.
    let (cli_config, sub_name) = match &cli.command {
        Commands::Optimize(args) => (&args.config, "optimize"),
        Commands::Evaluate(args) => (&args.config, "evaluate"),
        Commands::Inspect(args) => (&args.config, "inspect"),
    };
    let config = resolve_config(cli, cli_config, matches.subcommand_matches(sub_name))?;

    let baseline = match &cli.baseline {
        Some(raw) => Some(parse_i64_list(raw, "--baseline")?),
        None => None,
    };

    info!("📂 Loading snapshot: {}", cli.snapshot);
    let source = FileStateSource::new(&cli.snapshot).with_baseline(baseline);
    let session = Session::from_source(&source, config)?;

    match &cli.command {
        Commands::Optimize(args) => cmd::optimize::run(args, &session),
        Commands::Evaluate(args) => cmd::evaluate::run(args, &session),
        Commands::Inspect(args) => cmd::inspect::run(args, &session),
    }
}

fn resolve_config(
    cli: &Cli,
    cli_config: &Config,
    sub_matches: Option<&ArgMatches>,
) -> CfResult<Config> {
    let Some(path) = &cli.config_file else {
        return Ok(cli_config.clone());
    };

    info!("⚙️  Loading config from: {}", path);
    let mut config = Config::load_from_file(path)?;
    if let Some(sub) = sub_matches {
        config.merge_from_cli(cli_config, sub);
    }
    Ok(config)
}
