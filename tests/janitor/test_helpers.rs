//! Shared fixtures and helpers for janitor BDD scenarios.

use arrayctl::janitor::{JanitorConfig, SweepSummary};
use arrayctl::{ArrayBackend, RequestContext, SimulatedArray, SnapshotCreate, VolumeCreate};
use rstest::fixture;
use tokio::runtime::Runtime;

/// Size of volumes seeded into the simulated array.
const SEED_SIZE: u64 = 1_048_576;

#[derive(Clone, Debug)]
pub enum SweepOutcome {
    Success(SweepSummary),
    Failure(String),
}

#[derive(Clone, Debug)]
pub struct JanitorContext {
    pub array: SimulatedArray,
    pub config: Option<JanitorConfig>,
    pub outcome: Option<SweepOutcome>,
}

#[fixture]
pub fn janitor_context() -> JanitorContext {
    JanitorContext {
        array: SimulatedArray::new(),
        config: None,
        outcome: None,
    }
}

pub fn runtime() -> Runtime {
    Runtime::new().unwrap_or_else(|err| panic!("tokio runtime should start: {err}"))
}

/// Creates a volume and returns its id.
pub fn seed_volume(array: &SimulatedArray, name: &str) -> String {
    runtime()
        .block_on(array.create_volume(&RequestContext::new(), &VolumeCreate::new(name, SEED_SIZE)))
        .unwrap_or_else(|err| panic!("seed volume {name}: {err}"))
        .id
}

/// Snapshots `volume_id` under `name`.
pub fn seed_snapshot(array: &SimulatedArray, volume_id: &str, name: &str) {
    runtime()
        .block_on(array.create_snapshot(
            &RequestContext::new(),
            volume_id,
            &SnapshotCreate::new(name, "seeded by scenario"),
        ))
        .unwrap_or_else(|err| panic!("seed snapshot {name}: {err}"));
}

/// Names of every volume currently on the array.
pub fn volume_names(array: &SimulatedArray) -> Vec<String> {
    runtime()
        .block_on(array.get_volumes(&RequestContext::new()))
        .unwrap_or_else(|err| panic!("list volumes: {err}"))
        .into_iter()
        .map(|volume| volume.name)
        .collect()
}
