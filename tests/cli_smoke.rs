//! Behavioural smoke tests for the CLI entrypoints.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG_VARS: [&str; 4] = [
    "ARRAYCTL_ENDPOINT",
    "ARRAYCTL_USERNAME",
    "ARRAYCTL_PASSWORD",
    "ARRAYCTL_CONFIG_PATH",
];

#[test]
fn help_lists_resource_subcommands() {
    let mut cmd = cargo_bin_cmd!("arrayctl");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("volume").and(predicate::str::contains("snapshot")));
}

#[test]
fn volume_get_without_selector_is_a_usage_error() {
    let mut cmd = cargo_bin_cmd!("arrayctl");
    cmd.args(["volume", "get"]).assert().failure().code(2);
}

#[test]
fn missing_configuration_exits_with_status_one() {
    let workdir = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let mut cmd = cargo_bin_cmd!("arrayctl");
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd.current_dir(workdir.path())
        .env("HOME", workdir.path())
        .env("XDG_CONFIG_HOME", workdir.path())
        .args(["volume", "list"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn janitor_help_mentions_prefix_flag() {
    let mut cmd = cargo_bin_cmd!("arrayctl-janitor");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--prefix"));
}
