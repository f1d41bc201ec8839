//! Test-resource janitor.
//!
//! Harness runs that abort before cleanup leave volumes and snapshots whose
//! names carry the harness prefixes. The janitor finds them through any
//! [`ArrayBackend`], deletes snapshots first and volumes second, then lists
//! again and fails if anything matching remains.

use thiserror::Error;
use tracing::info;

use crate::backend::{ArrayBackend, RequestContext};
use crate::error::ArrayError;
use crate::harness::{CLONE_VOLUME_PREFIX, TEST_VOLUME_PREFIX};
use crate::snapshot::Snapshot;
use crate::volume::Volume;

/// Configuration for a janitor sweep.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JanitorConfig {
    /// Name prefixes identifying resources to delete.
    pub prefixes: Vec<String>,
}

impl JanitorConfig {
    /// Constructs a config, trimming whitespace from each prefix.
    ///
    /// # Errors
    ///
    /// Returns [`JanitorError::InvalidConfig`] when no prefix is given or any
    /// prefix is blank.
    pub fn new<I, S>(prefixes: I) -> Result<Self, JanitorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let trimmed: Vec<String> = prefixes
            .into_iter()
            .map(|prefix| prefix.into().trim().to_owned())
            .collect();
        if trimmed.is_empty() || trimmed.iter().any(String::is_empty) {
            return Err(JanitorError::InvalidConfig {
                field: String::from("prefixes"),
            });
        }
        Ok(Self { prefixes: trimmed })
    }

    /// Returns true when `name` starts with one of the configured prefixes.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            prefixes: vec![
                String::from(TEST_VOLUME_PREFIX),
                String::from(CLONE_VOLUME_PREFIX),
            ],
        }
    }
}

/// Summary of janitor work.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SweepSummary {
    /// Number of snapshots deleted during the sweep.
    pub deleted_snapshots: usize,
    /// Number of volumes deleted during the sweep.
    pub deleted_volumes: usize,
}

/// Errors returned by the janitor.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum JanitorError {
    /// Raised when configuration is missing required values.
    #[error("missing {field}")]
    InvalidConfig {
        /// Name of the missing or invalid field.
        field: String,
    },
    /// Raised when resources remain after the sweep.
    #[error("resources remain after janitor sweep: {message}")]
    NotClean {
        /// Human-readable description of what remains.
        message: String,
    },
    /// Raised when a backend call fails for a reason other than not-found.
    #[error(transparent)]
    Backend(#[from] ArrayError),
}

/// Deletes prefix-matching volumes and snapshots through a backend.
#[derive(Clone, Debug)]
pub struct Janitor<B> {
    config: JanitorConfig,
    backend: B,
}

impl<B: ArrayBackend> Janitor<B> {
    /// Creates a new janitor using the provided configuration and backend.
    #[must_use]
    pub const fn new(config: JanitorConfig, backend: B) -> Self {
        Self { config, backend }
    }

    /// Performs a sweep and returns how many resources were deleted.
    ///
    /// Snapshots are deleted first, matched by their own name or by the name
    /// of their parent volume. Matching volumes are deleted second. A
    /// resource that disappears between listing and deletion counts as gone
    /// but is left out of the summary.
    ///
    /// # Errors
    ///
    /// Returns [`JanitorError`] when listing or deletion fails, or resources
    /// remain after deletion attempts.
    pub async fn sweep(&self, ctx: &RequestContext) -> Result<SweepSummary, JanitorError> {
        let volumes = self.backend.get_volumes(ctx).await?;
        let snapshots = self.backend.get_snapshots(ctx).await?;

        let mut summary = SweepSummary::default();
        for snapshot in snapshots
            .iter()
            .filter(|snapshot| self.snapshot_matches(snapshot, &volumes))
        {
            info!(snapshot_id = %snapshot.id, snapshot_name = %snapshot.name, "deleting snapshot");
            if removed(self.backend.delete_snapshot(ctx, &snapshot.id).await)? {
                summary.deleted_snapshots += 1;
            }
        }

        for volume in volumes
            .iter()
            .filter(|volume| self.config.matches(&volume.name))
        {
            info!(volume_id = %volume.id, volume_name = %volume.name, "deleting volume");
            if removed(self.backend.delete_volume(ctx, &volume.id).await)? {
                summary.deleted_volumes += 1;
            }
        }

        let remaining_volumes: Vec<Volume> = self
            .backend
            .get_volumes(ctx)
            .await?
            .into_iter()
            .filter(|volume| self.config.matches(&volume.name))
            .collect();
        let remaining_snapshots: Vec<Snapshot> = self
            .backend
            .get_snapshots(ctx)
            .await?
            .into_iter()
            .filter(|snapshot| self.snapshot_matches(snapshot, &remaining_volumes))
            .collect();

        if !remaining_volumes.is_empty() || !remaining_snapshots.is_empty() {
            let message = format!(
                "snapshots remaining: {}, volumes remaining: {}",
                names(remaining_snapshots.iter().map(|snapshot| snapshot.name.as_str())),
                names(remaining_volumes.iter().map(|volume| volume.name.as_str())),
            );
            return Err(JanitorError::NotClean { message });
        }

        info!(
            deleted_snapshots = summary.deleted_snapshots,
            deleted_volumes = summary.deleted_volumes,
            "janitor sweep complete"
        );
        Ok(summary)
    }

    fn snapshot_matches(&self, snapshot: &Snapshot, volumes: &[Volume]) -> bool {
        self.config.matches(&snapshot.name)
            || volumes
                .iter()
                .any(|volume| volume.id == snapshot.parent_id && self.config.matches(&volume.name))
    }
}

/// True when the delete removed the resource, false when it was already gone.
fn removed(result: Result<(), ArrayError>) -> Result<bool, ArrayError> {
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}

fn names<'n>(items: impl Iterator<Item = &'n str>) -> String {
    let listed: Vec<&str> = items.collect();
    if listed.is_empty() {
        String::from("none")
    } else {
        listed.join(", ")
    }
}
