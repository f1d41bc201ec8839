//! Unit tests for the simulated array.

use rstest::{fixture, rstest};

use super::SimulatedArray;
use crate::backend::{ArrayBackend, RequestContext, TraceId};
use crate::error::ArrayError;
use crate::snapshot::SnapshotCreate;
use crate::volume::{VolumeClone, VolumeCreate};

const SIZE: u64 = 1_048_576;

#[fixture]
fn ctx() -> RequestContext {
    RequestContext::new()
}

#[rstest]
#[tokio::test]
async fn created_volume_is_visible_by_id_and_name(ctx: RequestContext) {
    let array = SimulatedArray::new();
    let created = array
        .create_volume(&ctx, &VolumeCreate::new("test_vol_a", SIZE))
        .await
        .expect("create");
    assert!(!created.id.is_empty());

    let by_id = array.get_volume(&ctx, &created.id).await.expect("by id");
    let by_name = array
        .get_volume_by_name(&ctx, "test_vol_a")
        .await
        .expect("by name");
    assert_eq!(by_id, by_name);
    assert_eq!(by_id.size, SIZE);
}

#[rstest]
#[tokio::test]
async fn duplicate_volume_name_is_rejected(ctx: RequestContext) {
    let array = SimulatedArray::new();
    let request = VolumeCreate::new("test_vol_dup", SIZE);
    array.create_volume(&ctx, &request).await.expect("first");

    let err = array
        .create_volume(&ctx, &request)
        .await
        .expect_err("duplicate should fail");
    assert!(err.volume_name_is_already_use(), "unexpected error: {err}");
}

#[rstest]
#[tokio::test]
async fn deleted_volume_lookups_fail_and_cascade_to_snapshots(ctx: RequestContext) {
    let array = SimulatedArray::new();
    let created = array
        .create_volume(&ctx, &VolumeCreate::new("test_vol_gone", SIZE))
        .await
        .expect("create");
    let snapshot = array
        .create_snapshot(&ctx, &created.id, &SnapshotCreate::new("snap", "desc"))
        .await
        .expect("snapshot");

    array
        .delete_volume(&ctx, &created.id)
        .await
        .expect("delete");

    let by_id = array
        .get_volume(&ctx, &created.id)
        .await
        .expect_err("id lookup should fail");
    assert!(by_id.volume_is_not_exist());
    let by_name = array
        .get_volume_by_name(&ctx, "test_vol_gone")
        .await
        .expect_err("name lookup should fail");
    assert!(by_name.volume_is_not_exist());
    let snap = array
        .get_snapshot(&ctx, &snapshot.id)
        .await
        .expect_err("snapshot should be gone");
    assert!(snap.snapshot_is_not_exist());
}

#[rstest]
#[tokio::test]
async fn deleting_unknown_volume_reports_not_found(ctx: RequestContext) {
    let array = SimulatedArray::new();
    let err = array
        .delete_volume(&ctx, "f98de58e-9223-4fdc-86bd-d4ff268e20e1")
        .await
        .expect_err("unknown volume");
    assert!(err.volume_is_not_exist());
}

#[rstest]
#[tokio::test]
async fn snapshot_of_missing_volume_reports_volume_not_found(ctx: RequestContext) {
    let array = SimulatedArray::new();
    let err = array
        .create_snapshot(&ctx, "missing", &SnapshotCreate::new("snap", "desc"))
        .await
        .expect_err("parent missing");
    assert!(err.volume_is_not_exist());
    assert!(!err.snapshot_is_not_exist());
}

#[rstest]
#[tokio::test]
async fn clone_gets_distinct_id_and_parent_size(ctx: RequestContext) {
    let array = SimulatedArray::new();
    let parent = array
        .create_volume(&ctx, &VolumeCreate::new("test_vol_parent", SIZE))
        .await
        .expect("create");
    let snapshot = array
        .create_snapshot(&ctx, &parent.id, &SnapshotCreate::new("snap", "desc"))
        .await
        .expect("snapshot");

    let clone = array
        .create_volume_from_snapshot(&ctx, &snapshot.id, &VolumeClone::new("clone"))
        .await
        .expect("clone");
    assert_ne!(clone.id, parent.id);
    assert_eq!(clone.size, SIZE);

    let collision = array
        .create_volume_from_snapshot(&ctx, &snapshot.id, &VolumeClone::new("test_vol_parent"))
        .await
        .expect_err("name collision");
    assert!(collision.volume_name_is_already_use());
}

#[rstest]
#[tokio::test]
async fn snapshots_by_unknown_volume_report_not_found(ctx: RequestContext) {
    let array = SimulatedArray::new();
    let err = array
        .get_snapshots_by_volume_id(&ctx, "missing")
        .await
        .expect_err("unknown parent");
    assert!(err.volume_is_not_exist());
}

#[rstest]
#[tokio::test]
async fn calls_record_trace_ids() {
    let array = SimulatedArray::new();
    let traced = RequestContext::new().with_trace_id("126c9213-11d4-40b4-8da2-8cd70e277fe4");
    array.get_volumes(&traced).await.expect("list");

    let calls = array.calls().await;
    let [call] = calls.as_slice() else {
        panic!("expected exactly one call, got {calls:?}");
    };
    assert_eq!(call.operation, "get_volumes");
    assert_eq!(
        call.trace_id,
        Some(TraceId::new("126c9213-11d4-40b4-8da2-8cd70e277fe4"))
    );
}

#[rstest]
#[tokio::test]
async fn queued_failure_is_returned_once(ctx: RequestContext) {
    let array = SimulatedArray::new();
    array
        .fail_next(ArrayError::Transport {
            message: String::from("connection reset"),
        })
        .await;

    let err = array.get_volumes(&ctx).await.expect_err("queued failure");
    assert!(matches!(err, ArrayError::Transport { .. }));
    assert!(array.get_volumes(&ctx).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn validation_happens_before_any_call_is_recorded(ctx: RequestContext) {
    let array = SimulatedArray::new();
    let err = array
        .create_volume(&ctx, &VolumeCreate::new("vol", 0))
        .await
        .expect_err("zero size");
    assert!(matches!(err, ArrayError::Validation(_)));
    assert!(array.calls().await.is_empty());
}
