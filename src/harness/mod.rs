//! Integration-test harness for array backends.
//!
//! A [`Harness`] borrows one backend, built once per run, and drives it
//! through create, act, assert, and cleanup sequences. Resource names carry
//! random suffixes so parallel or repeated runs do not collide, and
//! [`Harness::with_volume`] deletes the volume it created on every exit path
//! of the body. Resources orphaned by an aborted run keep the harness
//! prefixes and are removed by [`crate::janitor::Janitor`].

mod checks;

use std::future::Future;

use rand::Rng;
use rand::distributions::Alphanumeric;
use thiserror::Error;
use tracing::{debug, warn};

use crate::backend::{ArrayBackend, RequestContext};
use crate::error::ArrayError;
use crate::snapshot::{Snapshot, SnapshotCreate};
use crate::volume::VolumeCreate;

pub use checks::{Check, CheckReport, run_all};
pub use crate::config::DEFAULT_VOLUME_SIZE;

/// Prefix of volumes created by the harness.
pub const TEST_VOLUME_PREFIX: &str = "test_vol_";

/// Prefix of volumes cloned from snapshots by the harness.
pub const CLONE_VOLUME_PREFIX: &str = "new_volume_from_snap";

/// Suffix appended to a volume name to name its snapshot.
pub const SNAPSHOT_SUFFIX: &str = "_snapshot";

/// Description given to harness snapshots.
pub const SNAPSHOT_DESCRIPTION: &str = "just a description";

/// Length of the random suffix in generated names.
pub const NAME_SUFFIX_LEN: usize = 8;

/// Returns `len` random ASCII alphanumeric characters.
#[must_use]
pub fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Returns a fresh volume name carrying [`TEST_VOLUME_PREFIX`].
#[must_use]
pub fn random_volume_name() -> String {
    format!("{TEST_VOLUME_PREFIX}{}", random_suffix(NAME_SUFFIX_LEN))
}

/// Errors raised by harness checks.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A backend call the check relies on failed.
    #[error(transparent)]
    Backend(#[from] ArrayError),
    /// An expectation about a response did not hold.
    #[error("assertion failed: {0}")]
    Assertion(String),
    /// The check passed but deleting its resources failed.
    #[error("cleanup failed: {0}")]
    Cleanup(ArrayError),
    /// The check failed and deleting its resources failed too.
    #[error("{check}; cleanup also failed: {cleanup}")]
    CheckAndCleanup {
        /// Failure raised by the check body.
        check: Box<HarnessError>,
        /// Failure raised while deleting the check's resources.
        cleanup: ArrayError,
    },
}

/// Fails with [`HarnessError::Assertion`] when `condition` is false.
///
/// # Errors
///
/// Returns the assertion error built from `message`.
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), HarnessError> {
    if condition {
        Ok(())
    } else {
        Err(HarnessError::Assertion(message()))
    }
}

/// Combines a body outcome with the outcome of its cleanup.
fn settle<T>(
    outcome: Result<T, HarnessError>,
    cleanup: Result<(), ArrayError>,
) -> Result<T, HarnessError> {
    match (outcome, cleanup) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(err), Ok(())) => Err(err),
        (Ok(_), Err(cleanup_err)) => Err(HarnessError::Cleanup(cleanup_err)),
        (Err(err), Err(cleanup_err)) => Err(HarnessError::CheckAndCleanup {
            check: Box::new(err),
            cleanup: cleanup_err,
        }),
    }
}

/// A volume created by the harness.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestVolume {
    /// Server-assigned identifier.
    pub id: String,
    /// Generated name.
    pub name: String,
}

/// Drives one backend through harness sequences.
#[derive(Debug)]
pub struct Harness<'b, B: ?Sized> {
    backend: &'b B,
    ctx: RequestContext,
    volume_size: u64,
}

impl<'b, B: ArrayBackend + ?Sized> Harness<'b, B> {
    /// Creates a harness over `backend` with an empty context and the
    /// default volume size.
    #[must_use]
    pub fn new(backend: &'b B) -> Self {
        Self {
            backend,
            ctx: RequestContext::new(),
            volume_size: DEFAULT_VOLUME_SIZE,
        }
    }

    /// Sets the context passed to every call.
    #[must_use]
    pub fn with_context(mut self, ctx: RequestContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Sets the size of volumes created by the harness.
    #[must_use]
    pub const fn with_volume_size(mut self, size: u64) -> Self {
        self.volume_size = size;
        self
    }

    /// Backend under test.
    #[must_use]
    pub const fn backend(&self) -> &'b B {
        self.backend
    }

    /// Context passed to every call.
    #[must_use]
    pub const fn ctx(&self) -> &RequestContext {
        &self.ctx
    }

    /// Size of volumes created by the harness.
    #[must_use]
    pub const fn volume_size(&self) -> u64 {
        self.volume_size
    }

    /// Creates a volume with a random name.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Backend`] when creation fails and
    /// [`HarnessError::Assertion`] when the array returns an empty id. In the
    /// latter case the volume is looked up by name and deleted.
    pub async fn create_volume(&self) -> Result<TestVolume, HarnessError> {
        let name = random_volume_name();
        let request = VolumeCreate::new(&name, self.volume_size);
        let created = self.backend.create_volume(&self.ctx, &request).await?;
        if created.id.is_empty() {
            self.discard_by_name(&name).await;
            return Err(HarnessError::Assertion(format!(
                "volume {name} was created with an empty id"
            )));
        }
        debug!(volume_id = %created.id, volume_name = %name, "created test volume");
        Ok(TestVolume {
            id: created.id,
            name,
        })
    }

    /// Best-effort removal of a volume known only by name. Failures are
    /// logged and left for the janitor.
    async fn discard_by_name(&self, name: &str) {
        let outcome = match self.backend.get_volume_by_name(&self.ctx, name).await {
            Ok(volume) if !volume.id.is_empty() => {
                self.backend.delete_volume(&self.ctx, &volume.id).await
            }
            Ok(_) => Ok(()),
            Err(err) => Err(err),
        };
        if let Err(err) = outcome {
            warn!(volume_name = %name, error = %err, "failed to discard test volume");
        }
    }

    /// Deletes a volume created by the harness.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Backend`] when deletion fails.
    pub async fn delete_volume(&self, id: &str) -> Result<(), HarnessError> {
        self.backend.delete_volume(&self.ctx, id).await?;
        Ok(())
    }

    /// Confirms `volume` is readable under its name, then snapshots it as
    /// `<volume name>_snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the lookup or snapshot fails or the
    /// volume reports a different name.
    pub async fn create_snapshot(&self, volume: &TestVolume) -> Result<Snapshot, HarnessError> {
        let fetched = self.backend.get_volume(&self.ctx, &volume.id).await?;
        ensure(fetched.name == volume.name, || {
            format!(
                "volume {} reported name {}, expected {}",
                volume.id, fetched.name, volume.name
            )
        })?;
        let snapshot = self
            .backend
            .create_snapshot(&self.ctx, &volume.id, &Self::snapshot_request(volume))
            .await?;
        ensure(!snapshot.id.is_empty(), || {
            format!("snapshot of {} was created with an empty id", volume.name)
        })?;
        Ok(snapshot)
    }

    /// Snapshot request the harness issues for `volume`.
    #[must_use]
    pub fn snapshot_request(volume: &TestVolume) -> SnapshotCreate {
        SnapshotCreate::new(
            format!("{}{SNAPSHOT_SUFFIX}", volume.name),
            SNAPSHOT_DESCRIPTION,
        )
    }

    /// Creates a volume, runs `body` with it, and deletes the volume whether
    /// or not the body succeeded.
    ///
    /// # Errors
    ///
    /// Returns the body's error, the cleanup error, or both combined.
    pub async fn with_volume<F, Fut, T>(&self, body: F) -> Result<T, HarnessError>
    where
        F: FnOnce(TestVolume) -> Fut,
        Fut: Future<Output = Result<T, HarnessError>>,
    {
        let volume = self.create_volume().await?;
        let id = volume.id.clone();
        let outcome = body(volume).await;
        let cleanup = self.backend.delete_volume(&self.ctx, &id).await;
        if let Err(err) = &cleanup {
            warn!(volume_id = %id, error = %err, "failed to delete test volume");
        }
        settle(outcome, cleanup)
    }
}
