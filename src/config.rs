//! Configuration loading via `ortho-config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default size, in bytes, of volumes created by the test harness.
pub const DEFAULT_VOLUME_SIZE: u64 = 1_048_576;

/// Connection settings for the array management endpoint, derived from
/// environment variables and configuration files.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "ARRAYCTL",
    discovery(
        app_name = "arrayctl",
        env_var = "ARRAYCTL_CONFIG_PATH",
        config_file_name = "arrayctl.toml",
        dotfile_name = ".arrayctl.toml",
        project_file_name = "arrayctl.toml"
    )
)]
pub struct ArrayConfig {
    /// Root URL of the REST API (for example `https://10.0.0.1/api/rest`).
    pub endpoint: String,
    /// Management account user name.
    pub username: String,
    /// Management account password.
    pub password: String,
    /// Accept self-signed or otherwise invalid TLS certificates. Unset means
    /// certificates are verified.
    pub insecure: Option<bool>,
    /// Request timeout in seconds when the caller supplies no deadline.
    #[ortho_config(default = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
    /// Size in bytes of volumes created by the test harness.
    #[ortho_config(default = DEFAULT_VOLUME_SIZE)]
    pub default_volume_size: u64,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to arrayctl.toml",
            self.description, self.env_var, self.toml_key
        ))
    }
}

const ENDPOINT: FieldMetadata =
    FieldMetadata::new("management endpoint", "ARRAYCTL_ENDPOINT", "endpoint");
const USERNAME: FieldMetadata =
    FieldMetadata::new("management user name", "ARRAYCTL_USERNAME", "username");
const PASSWORD: FieldMetadata =
    FieldMetadata::new("management password", "ARRAYCTL_PASSWORD", "password");

impl ArrayConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(metadata.missing());
        }
        Ok(())
    }

    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags in
    /// that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("arrayctl")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Whether the HTTP client should skip certificate verification.
    #[must_use]
    pub const fn accepts_invalid_certs(&self) -> bool {
        matches!(self.insecure, Some(true))
    }

    /// Request timeout applied when a call carries no deadline of its own.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Endpoint without trailing slashes, ready for path concatenation.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }

    /// Performs semantic validation on required fields. Error messages include
    /// guidance on how to provide missing values via environment variables or
    /// configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty and
    /// [`ConfigError::Invalid`] when a value is unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(&self.endpoint, &ENDPOINT)?;
        Self::require_field(&self.username, &USERNAME)?;
        Self::require_field(&self.password, &PASSWORD)?;

        let endpoint = self.base_url();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ConfigError::Invalid(format!(
                "endpoint must be an http:// or https:// URL, got '{endpoint}'"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(String::from(
                "timeout_secs must be greater than zero",
            )));
        }
        if self.default_volume_size == 0 {
            return Err(ConfigError::Invalid(String::from(
                "default_volume_size must be greater than zero",
            )));
        }
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a configuration value is present but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
