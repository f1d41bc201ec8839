//! BDD step definitions for janitor behaviour.

use arrayctl::RequestContext;
use arrayctl::janitor::{Janitor, JanitorConfig};
use rstest_bdd_macros::{given, then, when};

use super::test_helpers::{
    JanitorContext, SweepOutcome, runtime, seed_snapshot, seed_volume, volume_names,
};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a janitor using the harness prefixes")]
fn janitor_with_defaults(mut janitor_context: JanitorContext) -> JanitorContext {
    janitor_context.config = Some(JanitorConfig::default());
    janitor_context
}

#[given("a janitor for prefix \"{prefix}\"")]
fn janitor_with_prefix(mut janitor_context: JanitorContext, prefix: String) -> JanitorContext {
    let config = JanitorConfig::new([prefix])
        .unwrap_or_else(|err| panic!("janitor config should be valid: {err}"));
    janitor_context.config = Some(config);
    janitor_context
}

#[given("the array holds a volume named \"{name}\"")]
fn array_holds_volume(janitor_context: JanitorContext, name: String) -> JanitorContext {
    seed_volume(&janitor_context.array, &name);
    janitor_context
}

#[given("the array holds a volume named \"{name}\" with a snapshot")]
fn array_holds_snapshotted_volume(janitor_context: JanitorContext, name: String) -> JanitorContext {
    let id = seed_volume(&janitor_context.array, &name);
    seed_snapshot(&janitor_context.array, &id, &format!("{name}_snapshot"));
    janitor_context
}

#[given("the array ignores deletion of volume \"{name}\"")]
fn array_ignores_deletion(janitor_context: JanitorContext, name: String) -> JanitorContext {
    let id = seed_volume(&janitor_context.array, &name);
    runtime().block_on(janitor_context.array.keep_volume_on_delete(&id));
    janitor_context
}

#[when("I run the janitor sweep")]
fn run_sweep(mut janitor_context: JanitorContext) -> JanitorContext {
    let config = janitor_context
        .config
        .clone()
        .unwrap_or_else(|| panic!("test setup requires configured janitor"));
    let janitor = Janitor::new(config, janitor_context.array.clone());
    let result = runtime().block_on(janitor.sweep(&RequestContext::new()));
    janitor_context.outcome = Some(match result {
        Ok(summary) => SweepOutcome::Success(summary),
        Err(err) => SweepOutcome::Failure(err.to_string()),
    });
    janitor_context
}

#[then("the janitor reports deleting {snapshots:u32} snapshot and {volumes:u32} volume")]
fn reports_deletions(
    janitor_context: &JanitorContext,
    snapshots: u32,
    volumes: u32,
) -> Result<(), StepError> {
    let Some(outcome) = janitor_context.outcome.as_ref() else {
        return Err(StepError::Assertion(String::from("missing outcome")));
    };
    let SweepOutcome::Success(summary) = outcome else {
        return Err(StepError::Assertion(format!(
            "expected success, got: {outcome:?}"
        )));
    };
    if summary.deleted_snapshots == snapshots as usize && summary.deleted_volumes == volumes as usize
    {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {snapshots} snapshots and {volumes} volumes, got {summary:?}"
        )))
    }
}

#[then("only volume \"{name}\" remains")]
fn only_volume_remains(janitor_context: &JanitorContext, name: String) -> Result<(), StepError> {
    let names = volume_names(&janitor_context.array);
    if names == [name.as_str()] {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected only {name} to remain, found {names:?}"
        )))
    }
}

#[then("the sweep fails naming \"{name}\"")]
fn sweep_fails_naming(janitor_context: &JanitorContext, name: String) -> Result<(), StepError> {
    match janitor_context.outcome.as_ref() {
        Some(SweepOutcome::Failure(message)) if message.contains(&name) => Ok(()),
        Some(SweepOutcome::Failure(message)) => Err(StepError::Assertion(format!(
            "failure does not mention {name}: {message}"
        ))),
        Some(SweepOutcome::Success(summary)) => Err(StepError::Assertion(format!(
            "expected failure, got success: {summary:?}"
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}
