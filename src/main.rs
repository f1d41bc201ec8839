//! Binary entry point for the `arrayctl` CLI.

mod cli;

use std::io::{self, Write};
use std::process;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;

use arrayctl::{
    ArrayBackend, ArrayConfig, ArrayError, CreateResponse, RequestContext, RestClient, Snapshot,
    SnapshotCreate, Volume, VolumeClone, VolumeCreate, logging,
};
use cli::{Cli, Command, SnapshotCommand, VolumeCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Array(#[from] ArrayError),
    #[error("failed to write output: {0}")]
    Output(String),
}

/// JSON document printed for a successful command.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Output {
    Created(CreateResponse),
    Volume(Volume),
    Volumes(Vec<Volume>),
    Snapshot(Snapshot),
    Snapshots(Vec<Snapshot>),
    Deleted { deleted: String },
}

#[tokio::main]
async fn main() {
    logging::init_logging();
    let cli = Cli::parse();
    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config =
        ArrayConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let default_size = config.default_volume_size;
    let client = RestClient::new(config)?;
    let ctx = request_context(cli.trace_id);
    let output = dispatch(&client, &ctx, cli.command, default_size).await?;
    write_output(io::stdout(), &output)
}

fn request_context(trace_id: Option<String>) -> RequestContext {
    trace_id.map_or_else(RequestContext::new, |id| {
        RequestContext::new().with_trace_id(id)
    })
}

async fn dispatch<B: ArrayBackend + ?Sized>(
    backend: &B,
    ctx: &RequestContext,
    command: Command,
    default_size: u64,
) -> Result<Output, CliError> {
    match command {
        Command::Volume(action) => volume(backend, ctx, action, default_size).await,
        Command::Snapshot(action) => snapshot(backend, ctx, action).await,
    }
}

async fn volume<B: ArrayBackend + ?Sized>(
    backend: &B,
    ctx: &RequestContext,
    action: VolumeCommand,
    default_size: u64,
) -> Result<Output, CliError> {
    let output = match action {
        VolumeCommand::Create {
            name,
            size,
            description,
        } => {
            let mut request = VolumeCreate::new(name, size.unwrap_or(default_size));
            if let Some(text) = description {
                request = request.description(text);
            }
            Output::Created(backend.create_volume(ctx, &request).await?)
        }
        VolumeCommand::Get { id: Some(id), .. } => {
            Output::Volume(backend.get_volume(ctx, &id).await?)
        }
        VolumeCommand::Get { name: Some(name), .. } => {
            Output::Volume(backend.get_volume_by_name(ctx, &name).await?)
        }
        VolumeCommand::Get { .. } => {
            return Err(ArrayError::Validation(String::from("pass --id or --name")).into());
        }
        VolumeCommand::List => Output::Volumes(backend.get_volumes(ctx).await?),
        VolumeCommand::Delete { id } => {
            backend.delete_volume(ctx, &id).await?;
            Output::Deleted { deleted: id }
        }
        VolumeCommand::Clone {
            snapshot_id,
            name,
            description,
        } => {
            let mut request = VolumeClone::new(name);
            if let Some(text) = description {
                request = request.description(text);
            }
            Output::Volume(
                backend
                    .create_volume_from_snapshot(ctx, &snapshot_id, &request)
                    .await?,
            )
        }
    };
    Ok(output)
}

async fn snapshot<B: ArrayBackend + ?Sized>(
    backend: &B,
    ctx: &RequestContext,
    action: SnapshotCommand,
) -> Result<Output, CliError> {
    let output = match action {
        SnapshotCommand::Create {
            volume_id,
            name,
            description,
        } => Output::Snapshot(
            backend
                .create_snapshot(ctx, &volume_id, &SnapshotCreate::new(name, description))
                .await?,
        ),
        SnapshotCommand::Get { id } => Output::Snapshot(backend.get_snapshot(ctx, &id).await?),
        SnapshotCommand::List {
            volume_id: Some(volume_id),
        } => Output::Snapshots(backend.get_snapshots_by_volume_id(ctx, &volume_id).await?),
        SnapshotCommand::List { volume_id: None } => {
            Output::Snapshots(backend.get_snapshots(ctx).await?)
        }
        SnapshotCommand::Delete { id } => {
            backend.delete_snapshot(ctx, &id).await?;
            Output::Deleted { deleted: id }
        }
    };
    Ok(output)
}

fn write_output(mut target: impl Write, output: &Output) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut target, output)
        .map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(target).map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
