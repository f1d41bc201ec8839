//! In-process array honouring the same contract as the REST backend.
//!
//! The simulator assigns UUID identifiers, enforces per-kind name
//! uniqueness, cascades snapshot deletion when a volume is deleted, and
//! reports unknown identifiers as not-found. Each call is recorded with its
//! trace id so tests can assert that correlation tokens were threaded
//! through. The context deadline is accepted and ignored.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::{ArrayBackend, BackendFuture, RequestContext, TraceId, require_id};
use crate::error::{ApiError, ArrayError, ResourceKind};
use crate::snapshot::{Snapshot, SnapshotCreate};
use crate::volume::{CreateResponse, Volume, VolumeClone, VolumeCreate};

/// A call observed by the simulator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedCall {
    /// Backend operation name (for example `create_volume`).
    pub operation: &'static str,
    /// Trace id carried by the call's context.
    pub trace_id: Option<TraceId>,
}

#[derive(Debug, Default)]
struct State {
    volumes: Vec<Volume>,
    snapshots: Vec<Snapshot>,
    calls: Vec<RecordedCall>,
    queued_failures: VecDeque<ArrayError>,
    sticky_volumes: HashSet<String>,
}

impl State {
    fn begin(&mut self, operation: &'static str, ctx: &RequestContext) -> Result<(), ArrayError> {
        self.calls.push(RecordedCall {
            operation,
            trace_id: ctx.trace_id().cloned(),
        });
        self.queued_failures.pop_front().map_or(Ok(()), Err)
    }

    fn volume(&self, id: &str) -> Result<&Volume, ArrayError> {
        self.volumes
            .iter()
            .find(|volume| volume.id == id)
            .ok_or_else(|| ApiError::not_found(ResourceKind::Volume, id).into())
    }

    fn snapshot(&self, id: &str) -> Result<&Snapshot, ArrayError> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.id == id)
            .ok_or_else(|| ApiError::not_found(ResourceKind::Snapshot, id).into())
    }

    fn ensure_volume_name_free(&self, name: &str) -> Result<(), ArrayError> {
        if self.volumes.iter().any(|volume| volume.name == name) {
            return Err(ApiError::name_in_use(ResourceKind::Volume, name).into());
        }
        Ok(())
    }

    fn ensure_snapshot_name_free(&self, name: &str) -> Result<(), ArrayError> {
        if self.snapshots.iter().any(|snapshot| snapshot.name == name) {
            return Err(ApiError::name_in_use(ResourceKind::Snapshot, name).into());
        }
        Ok(())
    }

    fn insert_volume(&mut self, name: &str, size: u64, description: Option<String>) -> Volume {
        let volume = Volume {
            id: Uuid::new_v4().to_string(),
            name: name.to_owned(),
            size,
            description,
        };
        self.volumes.push(volume.clone());
        volume
    }
}

/// Simulated storage array backed by shared in-memory state.
///
/// Clones share state, so a harness and a janitor built from clones of the
/// same simulator observe the same resources.
#[derive(Clone, Debug, Default)]
pub struct SimulatedArray {
    state: Arc<Mutex<State>>,
}

impl SimulatedArray {
    /// Creates an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an error returned by the next call instead of performing it.
    pub async fn fail_next(&self, error: ArrayError) {
        self.state.lock().await.queued_failures.push_back(error);
    }

    /// Makes deletes of `volume_id` report success while keeping the volume,
    /// mimicking an array that acknowledges but never completes a deletion.
    pub async fn keep_volume_on_delete(&self, volume_id: &str) {
        self.state
            .lock()
            .await
            .sticky_volumes
            .insert(volume_id.to_owned());
    }

    /// Returns every call observed so far.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().await.calls.clone()
    }

    async fn create_volume_inner(
        &self,
        ctx: &RequestContext,
        request: &VolumeCreate,
    ) -> Result<CreateResponse, ArrayError> {
        request.validate()?;
        let mut state = self.state.lock().await;
        state.begin("create_volume", ctx)?;
        state.ensure_volume_name_free(&request.name)?;
        let volume = state.insert_volume(&request.name, request.size, request.description.clone());
        Ok(CreateResponse { id: volume.id })
    }

    async fn get_volume_inner(&self, ctx: &RequestContext, id: &str) -> Result<Volume, ArrayError> {
        let wanted = require_id("volume_id", id)?;
        let mut state = self.state.lock().await;
        state.begin("get_volume", ctx)?;
        state.volume(wanted).cloned()
    }

    async fn get_volume_by_name_inner(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Volume, ArrayError> {
        let wanted = require_id("name", name)?;
        let mut state = self.state.lock().await;
        state.begin("get_volume_by_name", ctx)?;
        state
            .volumes
            .iter()
            .find(|volume| volume.name == wanted)
            .cloned()
            .ok_or_else(|| ApiError::not_found(ResourceKind::Volume, wanted).into())
    }

    async fn get_volumes_inner(&self, ctx: &RequestContext) -> Result<Vec<Volume>, ArrayError> {
        let mut state = self.state.lock().await;
        state.begin("get_volumes", ctx)?;
        Ok(state.volumes.clone())
    }

    async fn delete_volume_inner(&self, ctx: &RequestContext, id: &str) -> Result<(), ArrayError> {
        let wanted = require_id("volume_id", id)?;
        let mut state = self.state.lock().await;
        state.begin("delete_volume", ctx)?;
        state.volume(wanted)?;
        if state.sticky_volumes.contains(wanted) {
            return Ok(());
        }
        state.volumes.retain(|volume| volume.id != wanted);
        state.snapshots.retain(|snapshot| snapshot.parent_id != wanted);
        Ok(())
    }

    async fn create_snapshot_inner(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
        request: &SnapshotCreate,
    ) -> Result<Snapshot, ArrayError> {
        let parent = require_id("volume_id", volume_id)?;
        request.validate()?;
        let mut state = self.state.lock().await;
        state.begin("create_snapshot", ctx)?;
        let size = state.volume(parent)?.size;
        state.ensure_snapshot_name_free(&request.name)?;
        let snapshot = Snapshot {
            id: Uuid::new_v4().to_string(),
            name: request.name.clone(),
            description: request.description.clone(),
            parent_id: parent.to_owned(),
            size: Some(size),
        };
        state.snapshots.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn get_snapshot_inner(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<Snapshot, ArrayError> {
        let wanted = require_id("snapshot_id", id)?;
        let mut state = self.state.lock().await;
        state.begin("get_snapshot", ctx)?;
        state.snapshot(wanted).cloned()
    }

    async fn get_snapshots_by_volume_id_inner(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
    ) -> Result<Vec<Snapshot>, ArrayError> {
        let parent = require_id("volume_id", volume_id)?;
        let mut state = self.state.lock().await;
        state.begin("get_snapshots_by_volume_id", ctx)?;
        state.volume(parent)?;
        Ok(state
            .snapshots
            .iter()
            .filter(|snapshot| snapshot.parent_id == parent)
            .cloned()
            .collect())
    }

    async fn get_snapshots_inner(&self, ctx: &RequestContext) -> Result<Vec<Snapshot>, ArrayError> {
        let mut state = self.state.lock().await;
        state.begin("get_snapshots", ctx)?;
        Ok(state.snapshots.clone())
    }

    async fn delete_snapshot_inner(&self, ctx: &RequestContext, id: &str) -> Result<(), ArrayError> {
        let wanted = require_id("snapshot_id", id)?;
        let mut state = self.state.lock().await;
        state.begin("delete_snapshot", ctx)?;
        state.snapshot(wanted)?;
        state.snapshots.retain(|snapshot| snapshot.id != wanted);
        Ok(())
    }

    async fn create_volume_from_snapshot_inner(
        &self,
        ctx: &RequestContext,
        snapshot_id: &str,
        request: &VolumeClone,
    ) -> Result<Volume, ArrayError> {
        let source = require_id("snapshot_id", snapshot_id)?;
        request.validate()?;
        let mut state = self.state.lock().await;
        state.begin("create_volume_from_snapshot", ctx)?;
        let snapshot = state.snapshot(source)?;
        let size = match snapshot.size {
            Some(size) => size,
            None => state.volume(&snapshot.parent_id)?.size,
        };
        state.ensure_volume_name_free(&request.name)?;
        Ok(state.insert_volume(&request.name, size, request.description.clone()))
    }
}

impl ArrayBackend for SimulatedArray {
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
        Box::pin(self.get_volumes_inner(ctx))
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
        Box::pin(self.get_snapshots_by_volume_id_inner(ctx, volume_id))
    }

    fn get_snapshots<'a>(&'a self, ctx: &'a RequestContext) -> BackendFuture<'a, Vec<Snapshot>> {
        Box::pin(self.get_snapshots_inner(ctx))
    }

    fn delete_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        id: &'a str,
    ) -> BackendFuture<'a, ()> {
        Box::pin(self.delete_snapshot_inner(ctx, id))
    }

    fn create_volume_from_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        snapshot_id: &'a str,
        request: &'a VolumeClone,
    ) -> BackendFuture<'a, Volume> {
        Box::pin(self.create_volume_from_snapshot_inner(ctx, snapshot_id, request))
    }
}

#[cfg(test)]
mod tests;
