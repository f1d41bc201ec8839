//! Volume endpoints of the REST backend.

use reqwest::Method;

use super::RestClient;
use super::request::decode;
use crate::backend::{RequestContext, require_id};
use crate::error::{ApiError, ArrayError, ErrorScope, ResourceKind};
use crate::volume::{CreateResponse, Volume, VolumeClone, VolumeCreate};

const VOLUME: &str = "volume";
const SNAPSHOT: &str = "snapshot";
const CLONE: &str = "clone";
const VOLUME_SCOPE: ErrorScope = ErrorScope::single(ResourceKind::Volume);
const CLONE_SCOPE: ErrorScope = ErrorScope::derived(ResourceKind::Snapshot, ResourceKind::Volume);

impl RestClient {
    /// `POST /volume`.
    pub(in crate::rest) async fn post_volume(
        &self,
        ctx: &RequestContext,
        request: &VolumeCreate,
    ) -> Result<CreateResponse, ArrayError> {
        request.validate()?;
        let url = self.url(&[VOLUME])?;
        let body = self
            .send_json(ctx, Method::POST, url, request, VOLUME_SCOPE)
            .await?;
        decode(&body, "volume create response")
    }

    /// `GET /volume/{id}`.
    pub(in crate::rest) async fn fetch_volume(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<Volume, ArrayError> {
        let url = self.url(&[VOLUME, require_id("volume_id", id)?])?;
        let body = self.send(ctx, Method::GET, url, VOLUME_SCOPE).await?;
        decode(&body, "volume")
    }

    /// `GET /volume?name=eq.{name}`; an empty match is reported as not-found.
    pub(in crate::rest) async fn find_volume_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Volume, ArrayError> {
        let wanted = require_id("name", name)?;
        let url = self.url(&[VOLUME])?;
        let body = self
            .send_query(ctx, url, &[("name", format!("eq.{wanted}"))], VOLUME_SCOPE)
            .await?;
        let volumes: Vec<Volume> = decode(&body, "volume list")?;
        volumes
            .into_iter()
            .find(|volume| volume.name == wanted)
            .ok_or_else(|| ApiError::not_found(ResourceKind::Volume, wanted).into())
    }

    /// `GET /volume`.
    pub(in crate::rest) async fn list_volumes(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<Volume>, ArrayError> {
        let url = self.url(&[VOLUME])?;
        let body = self.send(ctx, Method::GET, url, VOLUME_SCOPE).await?;
        decode(&body, "volume list")
    }

    /// `DELETE /volume/{id}`.
    pub(in crate::rest) async fn remove_volume(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<(), ArrayError> {
        let url = self.url(&[VOLUME, require_id("volume_id", id)?])?;
        self.send(ctx, Method::DELETE, url, VOLUME_SCOPE).await?;
        Ok(())
    }

    /// `POST /snapshot/{id}/clone`, then fetches the new volume.
    pub(in crate::rest) async fn post_clone(
        &self,
        ctx: &RequestContext,
        snapshot_id: &str,
        request: &VolumeClone,
    ) -> Result<Volume, ArrayError> {
        request.validate()?;
        let url = self.url(&[SNAPSHOT, require_id("snapshot_id", snapshot_id)?, CLONE])?;
        let body = self
            .send_json(ctx, Method::POST, url, request, CLONE_SCOPE)
            .await?;
        let created: CreateResponse = decode(&body, "clone response")?;
        self.fetch_volume(ctx, &created.id).await
    }
}
