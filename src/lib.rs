//! Typed client for a storage array's management REST API.
//!
//! The crate exposes a backend abstraction over volumes and snapshots, a
//! REST implementation that talks to the array, an in-process simulator
//! honouring the same contract, and an integration-test harness that
//! exercises any backend (create → act → assert → delete). Failures surface
//! as a single classified error with predicates for the cases callers
//! branch on.

pub mod backend;
pub mod config;
pub mod error;
pub mod harness;
pub mod janitor;
pub mod logging;
pub mod rest;
pub mod simulator;
pub mod snapshot;
#[cfg(test)]
pub mod test_helpers;
pub mod volume;

pub use backend::{ArrayBackend, BackendFuture, RequestContext, TraceId};
pub use config::{ArrayConfig, ConfigError};
pub use error::{ApiError, ApiErrorKind, ArrayError, ResourceKind};
pub use harness::{Check, CheckReport, Harness, HarnessError, run_all};
pub use janitor::{Janitor, JanitorConfig, JanitorError, SweepSummary};
pub use rest::{REQUEST_ID_HEADER, RestClient};
pub use simulator::{RecordedCall, SimulatedArray};
pub use snapshot::{Snapshot, SnapshotCreate};
pub use volume::{CreateResponse, Volume, VolumeClone, VolumeCreate};
