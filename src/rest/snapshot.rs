//! Snapshot endpoints of the REST backend.

use reqwest::Method;

use super::RestClient;
use super::request::decode;
use crate::backend::{RequestContext, require_id};
use crate::error::{ArrayError, ErrorScope, ResourceKind};
use crate::snapshot::{Snapshot, SnapshotCreate};
use crate::volume::CreateResponse;

const VOLUME: &str = "volume";
const SNAPSHOT: &str = "snapshot";
const SNAPSHOT_SCOPE: ErrorScope = ErrorScope::single(ResourceKind::Snapshot);
const CREATE_SCOPE: ErrorScope =
    ErrorScope::derived(ResourceKind::Volume, ResourceKind::Snapshot);
const PARENT_SCOPE: ErrorScope = ErrorScope::single(ResourceKind::Volume);

impl RestClient {
    /// `POST /volume/{id}/snapshot`, then fetches the new snapshot.
    pub(in crate::rest) async fn post_snapshot(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
        request: &SnapshotCreate,
    ) -> Result<Snapshot, ArrayError> {
        request.validate()?;
        let url = self.url(&[VOLUME, require_id("volume_id", volume_id)?, SNAPSHOT])?;
        let body = self
            .send_json(ctx, Method::POST, url, request, CREATE_SCOPE)
            .await?;
        let created: CreateResponse = decode(&body, "snapshot create response")?;
        self.fetch_snapshot(ctx, &created.id).await
    }

    /// `GET /snapshot/{id}`.
    pub(in crate::rest) async fn fetch_snapshot(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<Snapshot, ArrayError> {
        let url = self.url(&[SNAPSHOT, require_id("snapshot_id", id)?])?;
        let body = self.send(ctx, Method::GET, url, SNAPSHOT_SCOPE).await?;
        decode(&body, "snapshot")
    }

    /// `GET /snapshot?parent_id=eq.{id}`.
    ///
    /// Entries for other parents are dropped. An empty result is only trusted
    /// once the parent volume is confirmed to exist, so an unknown volume
    /// surfaces as not-found.
    pub(in crate::rest) async fn list_snapshots_of(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
    ) -> Result<Vec<Snapshot>, ArrayError> {
        let parent = require_id("volume_id", volume_id)?;
        let url = self.url(&[SNAPSHOT])?;
        let body = self
            .send_query(
                ctx,
                url,
                &[("parent_id", format!("eq.{parent}"))],
                PARENT_SCOPE,
            )
            .await?;
        let listed: Vec<Snapshot> = decode(&body, "snapshot list")?;
        let snapshots: Vec<Snapshot> = listed
            .into_iter()
            .filter(|snapshot| snapshot.parent_id == parent)
            .collect();
        if snapshots.is_empty() {
            self.fetch_volume(ctx, parent).await?;
        }
        Ok(snapshots)
    }

    /// `GET /snapshot`.
    pub(in crate::rest) async fn list_snapshots(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<Snapshot>, ArrayError> {
        let url = self.url(&[SNAPSHOT])?;
        let body = self.send(ctx, Method::GET, url, SNAPSHOT_SCOPE).await?;
        decode(&body, "snapshot list")
    }

    /// `DELETE /snapshot/{id}`.
    pub(in crate::rest) async fn remove_snapshot(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<(), ArrayError> {
        let url = self.url(&[SNAPSHOT, require_id("snapshot_id", id)?])?;
        self.send(ctx, Method::DELETE, url, SNAPSHOT_SCOPE).await?;
        Ok(())
    }
}
