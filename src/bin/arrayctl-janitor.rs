//! Test-resource janitor for `arrayctl`.
//!
//! This binary deletes volumes and snapshots whose names carry the harness
//! prefixes (or the prefixes given on the command line) and then verifies
//! none remain.

use arrayctl::logging;
use arrayctl::{ArrayConfig, Janitor, JanitorConfig, RequestContext, RestClient};
use clap::Parser;
use std::io::Write as _;

#[derive(Debug, Parser)]
#[command(
    name = "arrayctl-janitor",
    about = "Delete volumes and snapshots left behind by integration-test runs"
)]
struct Cli {
    /// Name prefix of resources to delete; repeat for several prefixes.
    /// Defaults to the harness prefixes.
    #[arg(long = "prefix", value_name = "PREFIX")]
    prefixes: Vec<String>,
    /// Correlation id sent with every request.
    #[arg(long, value_name = "ID", env = "ARRAYCTL_TRACE_ID")]
    trace_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    logging::init_logging();
    let cli = Cli::parse();
    let janitor_config = if cli.prefixes.is_empty() {
        JanitorConfig::default()
    } else {
        JanitorConfig::new(cli.prefixes).map_err(|err| err.to_string())?
    };
    let array_config = ArrayConfig::load_without_cli_args().map_err(|err| err.to_string())?;
    let client = RestClient::new(array_config).map_err(|err| err.to_string())?;
    let ctx = cli
        .trace_id
        .map_or_else(RequestContext::new, |id| RequestContext::new().with_trace_id(id));

    let janitor = Janitor::new(janitor_config, client);
    let summary = janitor.sweep(&ctx).await.map_err(|err| err.to_string())?;
    writeln!(
        std::io::stdout(),
        "janitor sweep complete: deleted_snapshots={}, deleted_volumes={}",
        summary.deleted_snapshots,
        summary.deleted_volumes
    )
    .map_err(|err| err.to_string())?;
    Ok(())
}
