//! BDD scenarios for the janitor sweep.

use rstest_bdd_macros::scenario;

use super::test_helpers::{JanitorContext, janitor_context};

#[scenario(
    path = "tests/features/janitor.feature",
    name = "Delete harness resources and keep everything else"
)]
fn scenario_delete_harness_resources(janitor_context: JanitorContext) {
    let _ = janitor_context;
}

#[scenario(
    path = "tests/features/janitor.feature",
    name = "Sweep only the configured prefix"
)]
fn scenario_custom_prefix(janitor_context: JanitorContext) {
    let _ = janitor_context;
}

#[scenario(
    path = "tests/features/janitor.feature",
    name = "Fail the sweep when resources remain"
)]
fn scenario_fail_when_not_clean(janitor_context: JanitorContext) {
    let _ = janitor_context;
}
