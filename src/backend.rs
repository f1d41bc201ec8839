//! Backend abstraction over the storage array management API.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use uuid::Uuid;

use crate::error::ArrayError;
use crate::snapshot::{Snapshot, SnapshotCreate};
use crate::volume::{CreateResponse, Volume, VolumeClone, VolumeCreate};

/// Correlation token attached to outgoing calls for log correlation.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TraceId(String);

impl TraceId {
    /// Wraps a caller-chosen token, trimming surrounding whitespace.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_owned())
    }

    /// Generates a random UUID-based token.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TraceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TraceId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Per-call context threaded through every backend operation.
///
/// Neither field affects success or failure semantics: the trace id only
/// tags the outgoing call and the deadline bounds how long the transport
/// waits.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequestContext {
    trace_id: Option<TraceId>,
    timeout: Option<Duration>,
}

impl RequestContext {
    /// Creates a context with no trace id and no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the context tagged with `trace_id`.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into()).filter(|id| !id.as_str().is_empty());
        self
    }

    /// Returns a copy of the context bounded by `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Trace id attached to calls made with this context.
    #[must_use]
    pub const fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// Deadline for calls made with this context.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Rejects blank identifiers before any request is issued.
///
/// # Errors
///
/// Returns [`ArrayError::Validation`] naming `field` when `value` is blank.
pub fn require_id<'a>(field: &str, value: &'a str) -> Result<&'a str, ArrayError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ArrayError::Validation(format!("missing or empty field: {field}")));
    }
    Ok(trimmed)
}

/// Future returned by backend operations.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ArrayError>> + Send + 'a>>;

/// Volume and snapshot operations offered by a storage array.
///
/// Implementations must fail lookups and deletes of unknown identifiers with
/// a not-found [`crate::ApiError`], and creates that reuse a live name with a
/// name-in-use [`crate::ApiError`].
pub trait ArrayBackend: Send + Sync {
    /// Creates a volume and returns its server-assigned identifier.
    fn create_volume<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: &'a VolumeCreate,
    ) -> BackendFuture<'a, CreateResponse>;

    /// Fetches a volume by identifier.
    fn get_volume<'a>(&'a self, ctx: &'a RequestContext, id: &'a str)
    -> BackendFuture<'a, Volume>;

    /// Fetches a volume by its unique name.
    fn get_volume_by_name<'a>(
        &'a self,
        ctx: &'a RequestContext,
        name: &'a str,
    ) -> BackendFuture<'a, Volume>;

    /// Lists all volumes.
    fn get_volumes<'a>(&'a self, ctx: &'a RequestContext) -> BackendFuture<'a, Vec<Volume>>;

    /// Deletes a volume together with its snapshots.
    fn delete_volume<'a>(&'a self, ctx: &'a RequestContext, id: &'a str) -> BackendFuture<'a, ()>;

    /// Takes a snapshot of the volume identified by `volume_id`.
    fn create_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        volume_id: &'a str,
        request: &'a SnapshotCreate,
    ) -> BackendFuture<'a, Snapshot>;

    /// Fetches a snapshot by identifier.
    fn get_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        id: &'a str,
    ) -> BackendFuture<'a, Snapshot>;

    /// Lists the snapshots taken from one volume.
    fn get_snapshots_by_volume_id<'a>(
        &'a self,
        ctx: &'a RequestContext,
        volume_id: &'a str,
    ) -> BackendFuture<'a, Vec<Snapshot>>;

    /// Lists all snapshots.
    fn get_snapshots<'a>(&'a self, ctx: &'a RequestContext) -> BackendFuture<'a, Vec<Snapshot>>;

    /// Deletes a snapshot.
    fn delete_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        id: &'a str,
    ) -> BackendFuture<'a, ()>;

    /// Clones a new independent volume from a snapshot.
    fn create_volume_from_snapshot<'a>(
        &'a self,
        ctx: &'a RequestContext,
        snapshot_id: &'a str,
        request: &'a VolumeClone,
    ) -> BackendFuture<'a, Volume>;
}
