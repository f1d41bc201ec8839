//! Command-line interface definitions for the `arrayctl` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{ArgGroup, Parser, Subcommand};

/// Top-level CLI for the `arrayctl` binary.
#[derive(Debug, Parser)]
#[command(
    name = "arrayctl",
    about = "Manage volumes and snapshots on a storage array over its REST API",
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// Correlation id sent as `X-Request-ID` with every request.
    #[arg(long, global = true, value_name = "ID", env = "ARRAYCTL_TRACE_ID")]
    pub(crate) trace_id: Option<String>,
    /// Resource to operate on.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Resource families exposed by the CLI.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Create, inspect, delete, or clone volumes.
    #[command(name = "volume", subcommand)]
    Volume(VolumeCommand),
    /// Create, inspect, or delete snapshots.
    #[command(name = "snapshot", subcommand)]
    Snapshot(SnapshotCommand),
}

/// Arguments for `arrayctl volume`.
#[derive(Debug, Subcommand)]
pub(crate) enum VolumeCommand {
    /// Create a volume and print its id.
    Create {
        /// Name of the new volume; must be unique on the array.
        #[arg(long)]
        name: String,
        /// Size in bytes; defaults to the configured default volume size.
        #[arg(long, value_name = "BYTES")]
        size: Option<u64>,
        /// Optional free-text description.
        #[arg(long)]
        description: Option<String>,
    },
    /// Fetch a volume by id or by name.
    #[command(group(ArgGroup::new("lookup").required(true).args(["id", "name"])))]
    Get {
        /// Volume id.
        #[arg(long)]
        id: Option<String>,
        /// Volume name.
        #[arg(long)]
        name: Option<String>,
    },
    /// List every volume.
    List,
    /// Delete a volume and its snapshots.
    Delete {
        /// Volume id.
        #[arg(long)]
        id: String,
    },
    /// Create a new volume from a snapshot.
    Clone {
        /// Snapshot to clone from.
        #[arg(long, value_name = "ID")]
        snapshot_id: String,
        /// Name of the new volume.
        #[arg(long)]
        name: String,
        /// Optional free-text description.
        #[arg(long)]
        description: Option<String>,
    },
}

/// Arguments for `arrayctl snapshot`.
#[derive(Debug, Subcommand)]
pub(crate) enum SnapshotCommand {
    /// Snapshot a volume.
    Create {
        /// Volume to snapshot.
        #[arg(long, value_name = "ID")]
        volume_id: String,
        /// Name of the new snapshot; must be unique on the array.
        #[arg(long)]
        name: String,
        /// Free-text description.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Fetch a snapshot by id.
    Get {
        /// Snapshot id.
        #[arg(long)]
        id: String,
    },
    /// List snapshots, optionally only those of one volume.
    List {
        /// Restrict the listing to snapshots of this volume.
        #[arg(long, value_name = "ID")]
        volume_id: Option<String>,
    },
    /// Delete a snapshot.
    Delete {
        /// Snapshot id.
        #[arg(long)]
        id: String,
    },
}
