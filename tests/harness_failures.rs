//! Harness checks must reject arrays that break the resource contract.

use arrayctl::harness::{Check, Harness, HarnessError};
use arrayctl::{
    ApiError, ArrayBackend, ArrayError, BackendFuture, CreateResponse, RequestContext,
    ResourceKind, SimulatedArray, Snapshot, SnapshotCreate, Volume, VolumeClone, VolumeCreate,
};
use rstest::{fixture, rstest};

/// Contract violation layered over the simulator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Fault {
    /// Creating a volume under a taken name succeeds.
    DuplicateVolumeNames,
    /// Creating a snapshot under a taken name succeeds.
    DuplicateSnapshotNames,
    /// Volume lookups that miss return a stale record.
    StaleVolumes,
    /// Snapshot lookups that miss return a stale record.
    StaleSnapshots,
    /// Deleting an unknown volume succeeds.
    LenientVolumeDelete,
    /// Not-found errors name the wrong resource kind.
    SwappedNotFound,
    /// Volume creation answers with an empty id.
    EmptyVolumeId,
}

struct Misbehaving {
    inner: SimulatedArray,
    fault: Fault,
}

impl Misbehaving {
    fn is(&self, fault: Fault) -> bool {
        self.fault == fault
    }

    fn swap(&self, err: ArrayError) -> ArrayError {
        if !self.is(Fault::SwappedNotFound) {
            return err;
        }
        match err.as_api() {
            Some(api) if api.is_not_found() => {
                let other = match api.resource {
                    ResourceKind::Volume => ResourceKind::Snapshot,
                    ResourceKind::Snapshot => ResourceKind::Volume,
                };
                ApiError::not_found(other, "swapped").into()
            }
            _ => err,
        }
    }

    async fn create_volume_inner(
        &self,
        ctx: &RequestContext,
        request: &VolumeCreate,
    ) -> Result<CreateResponse, ArrayError> {
        match self.inner.create_volume(ctx, request).await {
            Err(err) if err.volume_name_is_already_use() && self.is(Fault::DuplicateVolumeNames) => {
                let renamed = VolumeCreate::new(format!("{}_dup", request.name), request.size);
                self.inner.create_volume(ctx, &renamed).await
            }
            Ok(_) if self.is(Fault::EmptyVolumeId) => Ok(CreateResponse { id: String::new() }),
            other => other,
        }
    }

    async fn get_volume_inner(&self, ctx: &RequestContext, id: &str) -> Result<Volume, ArrayError> {
        match self.inner.get_volume(ctx, id).await {
            Err(err) if err.is_not_found() && self.is(Fault::StaleVolumes) => {
                Ok(stale_volume(id, "stale"))
            }
            other => other.map_err(|err| self.swap(err)),
        }
    }

    async fn get_volume_by_name_inner(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Volume, ArrayError> {
        match self.inner.get_volume_by_name(ctx, name).await {
            Err(err) if err.is_not_found() && self.is(Fault::StaleVolumes) => {
                Ok(stale_volume("stale", name))
            }
            other => other.map_err(|err| self.swap(err)),
        }
    }

    async fn delete_volume_inner(&self, ctx: &RequestContext, id: &str) -> Result<(), ArrayError> {
        match self.inner.delete_volume(ctx, id).await {
            Err(err) if err.is_not_found() && self.is(Fault::LenientVolumeDelete) => Ok(()),
            other => other.map_err(|err| self.swap(err)),
        }
    }

    async fn create_snapshot_inner(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
        request: &SnapshotCreate,
    ) -> Result<Snapshot, ArrayError> {
        match self.inner.create_snapshot(ctx, volume_id, request).await {
            Err(err) if err.snapshot_name_is_already_use() && self.is(Fault::DuplicateSnapshotNames) => {
                let renamed =
                    SnapshotCreate::new(format!("{}_dup", request.name), &request.description);
                self.inner.create_snapshot(ctx, volume_id, &renamed).await
            }
            other => other.map_err(|err| self.swap(err)),
        }
    }

    async fn get_snapshot_inner(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<Snapshot, ArrayError> {
        match self.inner.get_snapshot(ctx, id).await {
            Err(err) if err.is_not_found() && self.is(Fault::StaleSnapshots) => Ok(Snapshot {
                id: id.to_owned(),
                name: String::from("stale"),
                description: String::new(),
                parent_id: String::from("stale"),
                size: None,
            }),
            other => other.map_err(|err| self.swap(err)),
        }
    }
}

fn stale_volume(id: &str, name: &str) -> Volume {
    Volume {
        id: id.to_owned(),
        name: name.to_owned(),
        size: 1,
        description: None,
    }
}

impl ArrayBackend for Misbehaving {
    fn create_volume<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: &'a VolumeCreate,
    ) -> BackendFuture<'a, CreateResponse> {
        Box::pin(self.create_volume_inner(ctx, request))
    }

    fn get_volume<'a>(
        &'a self,
        ctx: &'a RequestContext,
        id: &'a str,
    ) -> BackendFuture<'a, Volume> {
        Box::pin(self.get_volume_inner(ctx, id))
    }

    fn get_volume_by_name<'a>(
        &'a self,
        ctx: &'a RequestContext,
        name: &'a str,
    ) -> BackendFuture<'a, Volume> {
        Box::pin(self.get_volume_by_name_inner(ctx, name))
    }

    fn get_volumes<'a>(&'a self, ctx: &'a RequestContext) -> BackendFuture<'a, Vec<Volume>> {
        self.inner.get_volumes(ctx)
    }

    fn delete_volume<'a>(&'a self, ctx: &'a RequestContext, id: &'a str) -> BackendFuture<'a, ()> {
        Box::pin(self.delete_volume_inner(ctx, id))
    }

    fn create_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        volume_id: &'a str,
        request: &'a SnapshotCreate,
    ) -> BackendFuture<'a, Snapshot> {
        Box::pin(self.create_snapshot_inner(ctx, volume_id, request))
    }

    fn get_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        id: &'a str,
    ) -> BackendFuture<'a, Snapshot> {
        Box::pin(self.get_snapshot_inner(ctx, id))
    }

    fn get_snapshots_by_volume_id<'a>(
        &'a self,
        ctx: &'a RequestContext,
        volume_id: &'a str,
    ) -> BackendFuture<'a, Vec<Snapshot>> {
        self.inner.get_snapshots_by_volume_id(ctx, volume_id)
    }

    fn get_snapshots<'a>(&'a self, ctx: &'a RequestContext) -> BackendFuture<'a, Vec<Snapshot>> {
        self.inner.get_snapshots(ctx)
    }

    fn delete_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        id: &'a str,
    ) -> BackendFuture<'a, ()> {
        self.inner.delete_snapshot(ctx, id)
    }

    fn create_volume_from_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        snapshot_id: &'a str,
        request: &'a VolumeClone,
    ) -> BackendFuture<'a, Volume> {
        self.inner.create_volume_from_snapshot(ctx, snapshot_id, request)
    }
}

#[fixture]
fn array() -> SimulatedArray {
    SimulatedArray::new()
}

async fn assert_no_leftovers(array: &SimulatedArray) {
    let ctx = RequestContext::new();
    let volumes = array.get_volumes(&ctx).await.expect("list volumes");
    let snapshots = array.get_snapshots(&ctx).await.expect("list snapshots");
    assert!(volumes.is_empty(), "leftover volumes: {volumes:?}");
    assert!(snapshots.is_empty(), "leftover snapshots: {snapshots:?}");
}

#[rstest]
#[case::accepted_duplicate_volume(Check::VolumeAlreadyExists, Fault::DuplicateVolumeNames)]
#[case::accepted_duplicate_snapshot(Check::SnapshotAlreadyExists, Fault::DuplicateSnapshotNames)]
#[case::stale_unknown_volume(Check::GetInvalidVolume, Fault::StaleVolumes)]
#[case::stale_deleted_volume(Check::DeletedVolumeLookupsFail, Fault::StaleVolumes)]
#[case::stale_deleted_snapshot(Check::GetNonExistingSnapshot, Fault::StaleSnapshots)]
#[case::lenient_unknown_delete(Check::DeleteUnknownVolume, Fault::LenientVolumeDelete)]
#[case::swapped_unknown_volume(Check::GetInvalidVolume, Fault::SwappedNotFound)]
#[case::swapped_unknown_delete(Check::DeleteUnknownVolume, Fault::SwappedNotFound)]
#[case::swapped_deleted_volume(Check::DeletedVolumeLookupsFail, Fault::SwappedNotFound)]
#[case::swapped_deleted_snapshot(Check::GetNonExistingSnapshot, Fault::SwappedNotFound)]
#[tokio::test]
async fn check_rejects_contract_violation(
    array: SimulatedArray,
    #[case] check: Check,
    #[case] fault: Fault,
) {
    let backend = Misbehaving {
        inner: array.clone(),
        fault,
    };
    let harness = Harness::new(&backend);

    let err = check
        .run(&harness)
        .await
        .expect_err("check should reject the violation");

    assert!(
        matches!(err, HarnessError::Assertion(_)),
        "{check} with {fault:?} failed for the wrong reason: {err}"
    );
    assert_no_leftovers(&array).await;
}

#[rstest]
#[case::unknown_volume_lookup(Check::GetInvalidVolume)]
#[case::unknown_volume_delete(Check::DeleteUnknownVolume)]
#[tokio::test]
async fn check_rejects_unclassified_failure(array: SimulatedArray, #[case] check: Check) {
    array
        .fail_next(ArrayError::Transport {
            message: String::from("connection reset"),
        })
        .await;
    let harness = Harness::new(&array);

    let err = check
        .run(&harness)
        .await
        .expect_err("transport failure is not a not-found");

    assert!(
        matches!(err, HarnessError::Assertion(ref message) if message.contains("connection reset")),
        "unexpected error: {err}"
    );
}

#[rstest]
#[tokio::test]
async fn empty_volume_id_is_rejected_and_volume_discarded(array: SimulatedArray) {
    let backend = Misbehaving {
        inner: array.clone(),
        fault: Fault::EmptyVolumeId,
    };
    let harness = Harness::new(&backend);

    let err = harness
        .create_volume()
        .await
        .expect_err("empty id should be rejected");

    assert!(matches!(err, HarnessError::Assertion(_)), "unexpected error: {err}");
    assert_no_leftovers(&array).await;
}
