//! REST/JSON implementation of the array backend.

mod request;
mod snapshot;
mod types;
mod volume;

use reqwest::Url;

use crate::backend::{ArrayBackend, BackendFuture, RequestContext};
use crate::config::ArrayConfig;
use crate::error::ArrayError;
use crate::snapshot::{Snapshot, SnapshotCreate};
use crate::volume::{CreateResponse, Volume, VolumeClone, VolumeCreate};

/// Header carrying the caller's trace id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Backend that manages volumes through the array's REST API.
#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
    base: Url,
    config: ArrayConfig,
}

impl RestClient {
    /// Constructs a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Config`] when the configuration fails validation
    /// or the HTTP client cannot be built.
    pub fn new(config: ArrayConfig) -> Result<Self, ArrayError> {
        config.validate()?;
        let base = Url::parse(config.base_url())
            .map_err(|err| ArrayError::Config(format!("invalid endpoint: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(ArrayError::Config(format!(
                "endpoint {base} cannot be used as a base URL"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.accepts_invalid_certs())
            .build()
            .map_err(|err| ArrayError::Config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { http, base, config })
    }

    /// Configuration the client was built from.
    #[must_use]
    pub const fn config(&self) -> &ArrayConfig {
        &self.config
    }
}

impl ArrayBackend for RestClient {
    fn create_volume<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: &'a VolumeCreate,
    ) -> BackendFuture<'a, CreateResponse> {
        Box::pin(async move { self.post_volume(ctx, request).await })
    }

    fn get_volume<'a>(
        &'a self,
        ctx: &'a RequestContext,
        id: &'a str,
    ) -> BackendFuture<'a, Volume> {
        Box::pin(async move { self.fetch_volume(ctx, id).await })
    }

    fn get_volume_by_name<'a>(
        &'a self,
        ctx: &'a RequestContext,
        name: &'a str,
    ) -> BackendFuture<'a, Volume> {
        Box::pin(async move { self.find_volume_by_name(ctx, name).await })
    }

    fn get_volumes<'a>(&'a self, ctx: &'a RequestContext) -> BackendFuture<'a, Vec<Volume>> {
        Box::pin(async move { self.list_volumes(ctx).await })
    }

    fn delete_volume<'a>(&'a self, ctx: &'a RequestContext, id: &'a str) -> BackendFuture<'a, ()> {
        Box::pin(async move { self.remove_volume(ctx, id).await })
    }

    fn create_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        volume_id: &'a str,
        request: &'a SnapshotCreate,
    ) -> BackendFuture<'a, Snapshot> {
        Box::pin(async move { self.post_snapshot(ctx, volume_id, request).await })
    }

    fn get_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        id: &'a str,
    ) -> BackendFuture<'a, Snapshot> {
        Box::pin(async move { self.fetch_snapshot(ctx, id).await })
    }

    fn get_snapshots_by_volume_id<'a>(
        &'a self,
        ctx: &'a RequestContext,
        volume_id: &'a str,
    ) -> BackendFuture<'a, Vec<Snapshot>> {
        Box::pin(async move { self.list_snapshots_of(ctx, volume_id).await })
    }

    fn get_snapshots<'a>(&'a self, ctx: &'a RequestContext) -> BackendFuture<'a, Vec<Snapshot>> {
        Box::pin(async move { self.list_snapshots(ctx).await })
    }

    fn delete_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        id: &'a str,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move { self.remove_snapshot(ctx, id).await })
    }

    fn create_volume_from_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        snapshot_id: &'a str,
        request: &'a VolumeClone,
    ) -> BackendFuture<'a, Volume> {
        Box::pin(async move { self.post_clone(ctx, snapshot_id, request).await })
    }
}
