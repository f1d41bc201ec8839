//! Tracing subscriber setup shared by the binaries.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to `arrayctl` and `arrayctl-janitor`, which log to stderr so stdout stays
//! reserved for JSON output.

use std::io;

use tracing_subscriber::EnvFilter;

/// Level applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Transport crates that are chatty at `debug`.
const NOISY_TARGETS: &[(&str, &str)] = &[("hyper", "warn"), ("reqwest", "warn"), ("rustls", "warn")];

/// Directives used when `RUST_LOG` is unset: `default_level` with transport
/// crates held at `warn`.
#[must_use]
pub fn fallback_directives(default_level: &str) -> String {
    let directives: Vec<String> = std::iter::once(default_level.to_owned())
        .chain(
            NOISY_TARGETS
                .iter()
                .map(|(target, level)| format!("{target}={level}")),
        )
        .collect();
    directives.join(",")
}

/// Builds the filter from `RUST_LOG`, falling back to
/// [`fallback_directives`].
#[must_use]
pub fn build_env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_directives(default_level)))
}

/// Installs a compact stderr subscriber. Repeated calls are ignored.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(DEFAULT_LOG_LEVEL))
        .with_writer(io::stderr)
        .with_target(true)
        .compact()
        .try_init()
        .ok();
}
