//! Catalogue of harness checks.
//!
//! Each check is a short linear sequence of backend calls followed by
//! assertions, with every resource it creates deleted before it returns.

use std::fmt;

use tracing::info;

use super::{
    CLONE_VOLUME_PREFIX, Harness, HarnessError, NAME_SUFFIX_LEN, ensure, random_suffix,
};
use crate::backend::{ArrayBackend, RequestContext};
use crate::volume::{VolumeClone, VolumeCreate};

/// Well-formed UUID that no array assigns.
const UNKNOWN_VOLUME_ID: &str = "f98de58e-9223-4fdc-86bd-d4ff268e20e1";
/// Second well-formed UUID used for lookups of unknown volumes.
const INVALID_VOLUME_ID: &str = "4961282c-c5c5-4234-935f-2742fed499d0";
/// Trace id attached by [`Check::GetVolumesWithTrace`].
const TRACE_ID: &str = "126c9213-11d4-40b4-8da2-8cd70e277fe4";

/// A named harness check.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Check {
    /// Create a volume, then delete it.
    CreateDeleteVolume,
    /// Fetch a created volume by id.
    GetVolume,
    /// Fetch a created volume by name.
    GetVolumeByName,
    /// List volumes.
    GetVolumes,
    /// List volumes with a trace id attached.
    GetVolumesWithTrace,
    /// A second create with the same name fails with a name conflict.
    VolumeAlreadyExists,
    /// Fetching an unassigned id fails with volume not-found.
    GetInvalidVolume,
    /// Deleting an unassigned id fails with volume not-found.
    DeleteUnknownVolume,
    /// After deletion, lookups by id and by name fail with not-found.
    DeletedVolumeLookupsFail,
    /// Snapshot a volume.
    CreateSnapshot,
    /// Snapshot a volume, then delete the snapshot.
    DeleteSnapshot,
    /// Fetch a created snapshot by id.
    GetSnapshot,
    /// List snapshots.
    GetSnapshots,
    /// Listing by parent returns exactly the one snapshot taken.
    GetSnapshotsByVolumeId,
    /// Fetching a deleted snapshot fails with snapshot not-found.
    GetNonExistingSnapshot,
    /// A second snapshot with the same name fails with a name conflict.
    SnapshotAlreadyExists,
    /// Clone a volume from a snapshot, then delete the clone.
    CreateVolumeFromSnapshot,
}

impl Check {
    /// Every check, in execution order.
    pub const ALL: [Self; 17] = [
        Self::CreateDeleteVolume,
        Self::GetVolume,
        Self::GetVolumeByName,
        Self::GetVolumes,
        Self::GetVolumesWithTrace,
        Self::VolumeAlreadyExists,
        Self::GetInvalidVolume,
        Self::DeleteUnknownVolume,
        Self::DeletedVolumeLookupsFail,
        Self::CreateSnapshot,
        Self::DeleteSnapshot,
        Self::GetSnapshot,
        Self::GetSnapshots,
        Self::GetSnapshotsByVolumeId,
        Self::GetNonExistingSnapshot,
        Self::SnapshotAlreadyExists,
        Self::CreateVolumeFromSnapshot,
    ];

    /// Snake-case name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateDeleteVolume => "create_delete_volume",
            Self::GetVolume => "get_volume",
            Self::GetVolumeByName => "get_volume_by_name",
            Self::GetVolumes => "get_volumes",
            Self::GetVolumesWithTrace => "get_volumes_with_trace",
            Self::VolumeAlreadyExists => "volume_already_exists",
            Self::GetInvalidVolume => "get_invalid_volume",
            Self::DeleteUnknownVolume => "delete_unknown_volume",
            Self::DeletedVolumeLookupsFail => "deleted_volume_lookups_fail",
            Self::CreateSnapshot => "create_snapshot",
            Self::DeleteSnapshot => "delete_snapshot",
            Self::GetSnapshot => "get_snapshot",
            Self::GetSnapshots => "get_snapshots",
            Self::GetSnapshotsByVolumeId => "get_snapshots_by_volume_id",
            Self::GetNonExistingSnapshot => "get_non_existing_snapshot",
            Self::SnapshotAlreadyExists => "snapshot_already_exists",
            Self::CreateVolumeFromSnapshot => "create_volume_from_snapshot",
        }
    }

    /// Looks a check up by its [`Check::name`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|check| check.name() == name)
    }

    /// Runs the check against the harness backend.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when a call or an expectation fails.
    pub async fn run<B: ArrayBackend + ?Sized>(
        self,
        harness: &Harness<'_, B>,
    ) -> Result<(), HarnessError> {
        match self {
            Self::CreateDeleteVolume => create_delete_volume(harness).await,
            Self::GetVolume => get_volume(harness).await,
            Self::GetVolumeByName => get_volume_by_name(harness).await,
            Self::GetVolumes => get_volumes(harness).await,
            Self::GetVolumesWithTrace => get_volumes_with_trace(harness).await,
            Self::VolumeAlreadyExists => volume_already_exists(harness).await,
            Self::GetInvalidVolume => get_invalid_volume(harness).await,
            Self::DeleteUnknownVolume => delete_unknown_volume(harness).await,
            Self::DeletedVolumeLookupsFail => deleted_volume_lookups_fail(harness).await,
            Self::CreateSnapshot => create_snapshot(harness).await,
            Self::DeleteSnapshot => delete_snapshot(harness).await,
            Self::GetSnapshot => get_snapshot(harness).await,
            Self::GetSnapshots => get_snapshots(harness).await,
            Self::GetSnapshotsByVolumeId => get_snapshots_by_volume_id(harness).await,
            Self::GetNonExistingSnapshot => get_non_existing_snapshot(harness).await,
            Self::SnapshotAlreadyExists => snapshot_already_exists(harness).await,
            Self::CreateVolumeFromSnapshot => create_volume_from_snapshot(harness).await,
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one check in a [`run_all`] pass.
#[derive(Debug)]
pub struct CheckReport {
    /// Check that ran.
    pub check: Check,
    /// Its outcome.
    pub result: Result<(), HarnessError>,
}

impl CheckReport {
    /// Returns true when the check passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs `checks` in order, continuing past failures.
pub async fn run_all<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
    checks: &[Check],
) -> Vec<CheckReport> {
    let mut reports = Vec::with_capacity(checks.len());
    for &check in checks {
        let result = check.run(harness).await;
        info!(check = check.name(), passed = result.is_ok(), "check finished");
        reports.push(CheckReport { check, result });
    }
    reports
}

async fn create_delete_volume<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    let volume = harness.create_volume().await?;
    harness.delete_volume(&volume.id).await
}

async fn get_volume<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    harness
        .with_volume(|volume| async move {
            let fetched = harness
                .backend()
                .get_volume(harness.ctx(), &volume.id)
                .await?;
            ensure(fetched.name == volume.name, || {
                format!("expected name {}, got {}", volume.name, fetched.name)
            })?;
            ensure(fetched.id == volume.id, || {
                format!("expected id {}, got {}", volume.id, fetched.id)
            })
        })
        .await
}

async fn get_volume_by_name<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    harness
        .with_volume(|volume| async move {
            let fetched = harness
                .backend()
                .get_volume_by_name(harness.ctx(), &volume.name)
                .await?;
            ensure(fetched.name == volume.name, || {
                format!("expected name {}, got {}", volume.name, fetched.name)
            })?;
            ensure(fetched.id == volume.id, || {
                format!("expected id {}, got {}", volume.id, fetched.id)
            })
        })
        .await
}

async fn get_volumes<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    harness.backend().get_volumes(harness.ctx()).await?;
    Ok(())
}

async fn get_volumes_with_trace<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    let traced: RequestContext = harness.ctx().clone().with_trace_id(TRACE_ID);
    harness.backend().get_volumes(&traced).await?;
    Ok(())
}

async fn volume_already_exists<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    harness
        .with_volume(|volume| async move {
            let duplicate = VolumeCreate::new(&volume.name, harness.volume_size());
            match harness
                .backend()
                .create_volume(harness.ctx(), &duplicate)
                .await
            {
                Ok(created) => {
                    // Best effort: the duplicate must not outlive the check.
                    let cleanup = harness.delete_volume(&created.id).await;
                    ensure(false, || {
                        format!("duplicate name {} was accepted", volume.name)
                    })
                    .and(cleanup)
                }
                Err(err) => ensure(err.volume_name_is_already_use(), || {
                    format!("expected volume name conflict, got {err}")
                }),
            }
        })
        .await
}

async fn get_invalid_volume<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    match harness
        .backend()
        .get_volume(harness.ctx(), INVALID_VOLUME_ID)
        .await
    {
        Ok(volume) => Err(HarnessError::Assertion(format!(
            "lookup of unassigned id returned volume {}",
            volume.name
        ))),
        Err(err) => ensure(err.volume_is_not_exist(), || {
            format!("expected volume not-found, got {err}")
        }),
    }
}

async fn delete_unknown_volume<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    match harness
        .backend()
        .delete_volume(harness.ctx(), UNKNOWN_VOLUME_ID)
        .await
    {
        Ok(()) => Err(HarnessError::Assertion(format!(
            "delete of unassigned id {UNKNOWN_VOLUME_ID} succeeded"
        ))),
        Err(err) => ensure(err.volume_is_not_exist(), || {
            format!("expected volume not-found, got {err}")
        }),
    }
}

async fn deleted_volume_lookups_fail<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    let volume = harness.create_volume().await?;
    harness.delete_volume(&volume.id).await?;

    let by_id = harness.backend().get_volume(harness.ctx(), &volume.id).await;
    ensure(
        by_id.as_ref().is_err_and(|err| err.volume_is_not_exist()),
        || format!("lookup by id after delete returned {by_id:?}"),
    )?;

    let by_name = harness
        .backend()
        .get_volume_by_name(harness.ctx(), &volume.name)
        .await;
    ensure(
        by_name.as_ref().is_err_and(|err| err.volume_is_not_exist()),
        || format!("lookup by name after delete returned {by_name:?}"),
    )
}

async fn create_snapshot<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    harness
        .with_volume(|volume| async move {
            let snapshot = harness.create_snapshot(&volume).await?;
            ensure(snapshot.parent_id == volume.id, || {
                format!(
                    "snapshot {} reports parent {}, expected {}",
                    snapshot.id, snapshot.parent_id, volume.id
                )
            })
        })
        .await
}

async fn delete_snapshot<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    harness
        .with_volume(|volume| async move {
            let snapshot = harness.create_snapshot(&volume).await?;
            harness
                .backend()
                .delete_snapshot(harness.ctx(), &snapshot.id)
                .await?;
            Ok(())
        })
        .await
}

async fn get_snapshot<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    harness
        .with_volume(|volume| async move {
            let snapshot = harness.create_snapshot(&volume).await?;
            let fetched = harness
                .backend()
                .get_snapshot(harness.ctx(), &snapshot.id)
                .await?;
            ensure(fetched.id == snapshot.id, || {
                format!("expected snapshot {}, got {}", snapshot.id, fetched.id)
            })
        })
        .await
}

async fn get_snapshots<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    harness.backend().get_snapshots(harness.ctx()).await?;
    Ok(())
}

async fn get_snapshots_by_volume_id<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    harness
        .with_volume(|volume| async move {
            let snapshot = harness.create_snapshot(&volume).await?;
            let listed = harness
                .backend()
                .get_snapshots_by_volume_id(harness.ctx(), &volume.id)
                .await?;
            let ids: Vec<&str> = listed.iter().map(|entry| entry.id.as_str()).collect();
            ensure(ids == [snapshot.id.as_str()], || {
                format!("expected exactly [{}], got {ids:?}", snapshot.id)
            })
        })
        .await
}

async fn get_non_existing_snapshot<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    harness
        .with_volume(|volume| async move {
            let snapshot = harness.create_snapshot(&volume).await?;
            harness
                .backend()
                .delete_snapshot(harness.ctx(), &snapshot.id)
                .await?;
            let fetched = harness
                .backend()
                .get_snapshot(harness.ctx(), &snapshot.id)
                .await;
            ensure(
                fetched.as_ref().is_err_and(|err| err.snapshot_is_not_exist()),
                || format!("lookup of deleted snapshot returned {fetched:?}"),
            )
        })
        .await
}

async fn snapshot_already_exists<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    harness
        .with_volume(|volume| async move {
            harness.create_snapshot(&volume).await?;
            let duplicate = Harness::<B>::snapshot_request(&volume);
            match harness
                .backend()
                .create_snapshot(harness.ctx(), &volume.id, &duplicate)
                .await
            {
                Ok(snapshot) => Err(HarnessError::Assertion(format!(
                    "duplicate snapshot name {} was accepted as {}",
                    duplicate.name, snapshot.id
                ))),
                Err(err) => ensure(err.snapshot_name_is_already_use(), || {
                    format!("expected snapshot name conflict, got {err}")
                }),
            }
        })
        .await
}

async fn create_volume_from_snapshot<B: ArrayBackend + ?Sized>(
    harness: &Harness<'_, B>,
) -> Result<(), HarnessError> {
    harness
        .with_volume(|volume| async move {
            let snapshot = harness.create_snapshot(&volume).await?;
            let name = format!("{CLONE_VOLUME_PREFIX}{}", random_suffix(NAME_SUFFIX_LEN));
            let clone = harness
                .backend()
                .create_volume_from_snapshot(harness.ctx(), &snapshot.id, &VolumeClone::new(name))
                .await?;
            let verdict = ensure(!clone.id.is_empty() && clone.id != volume.id, || {
                format!(
                    "clone id {:?} must be non-empty and differ from parent {}",
                    clone.id, volume.id
                )
            });
            if clone.id.is_empty() {
                return verdict;
            }
            harness.delete_volume(&clone.id).await?;
            verdict
        })
        .await
}
