use crate::reports;
use cardforge::api::Session;
use cardforge::config::Config;
use cardforge::error::CfResult;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub config: Config,
}

pub fn run(_args: &InspectArgs, session: &Session) -> CfResult<()> {
    reports::print_catalog(session.catalog(), session.baseline());
    Ok(())
}
