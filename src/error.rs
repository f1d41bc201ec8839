//! Classified errors surfaced by every array backend.
//!
//! Callers inspect failures through [`ApiErrorKind`] and the named predicates
//! on [`ApiError`] and [`ArrayError`] rather than by matching message text.

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;

/// Resource kinds exposed by the management API.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ResourceKind {
    /// Block volume.
    Volume,
    /// Point-in-time snapshot of a volume.
    Snapshot,
}

impl ResourceKind {
    /// Lower-case label used in messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a failure reported by the management API.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ApiErrorKind {
    /// The referenced resource does not exist.
    NotFound,
    /// The requested name is already used by a live resource of the same kind.
    NameInUse,
    /// The request was malformed or violated a server-side constraint.
    BadRequest,
    /// Credentials were missing or rejected.
    Unauthorized,
    /// The array failed while handling the request.
    Server,
    /// Any other status the client does not classify further.
    Unexpected,
}

impl ApiErrorKind {
    /// Classifies an HTTP status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            409 | 422 => Self::NameInUse,
            400 => Self::BadRequest,
            401 | 403 => Self::Unauthorized,
            500..=599 => Self::Server,
            _ => Self::Unexpected,
        }
    }
}

/// Which resource kind a not-found or name conflict refers to for one call.
///
/// A snapshot create that fails with 404 is missing its parent volume, while
/// a 422 from the same call is a snapshot name collision.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ErrorScope {
    /// Resource reported when the API answers not-found.
    pub missing: ResourceKind,
    /// Resource reported when the API answers with a name conflict.
    pub conflicting: ResourceKind,
}

impl ErrorScope {
    /// Scope where both outcomes refer to the same resource kind.
    #[must_use]
    pub const fn single(kind: ResourceKind) -> Self {
        Self {
            missing: kind,
            conflicting: kind,
        }
    }

    /// Scope for calls that look up one resource and create another.
    #[must_use]
    pub const fn derived(missing: ResourceKind, conflicting: ResourceKind) -> Self {
        Self {
            missing,
            conflicting,
        }
    }

    /// Resource kind the classified error is attributed to.
    #[must_use]
    pub const fn resource_for(self, kind: ApiErrorKind) -> ResourceKind {
        match kind {
            ApiErrorKind::NameInUse => self.conflicting,
            _ => self.missing,
        }
    }
}

/// A classified error returned by the management API.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApiError {
    /// HTTP status code (404 for lookups that matched nothing).
    pub status: u16,
    /// Classification derived from the status.
    pub kind: ApiErrorKind,
    /// Resource kind the failure refers to.
    pub resource: ResourceKind,
    /// Array-specific message code, when the body carried one.
    pub code: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// Builds an error from a status code, attributing it through `scope`.
    #[must_use]
    pub fn from_status(status: u16, scope: ErrorScope, message: impl Into<String>) -> Self {
        let kind = ApiErrorKind::from_status(status);
        Self {
            status,
            kind,
            resource: scope.resource_for(kind),
            code: None,
            message: message.into(),
        }
    }

    /// Not-found error for the given resource.
    #[must_use]
    pub fn not_found(resource: ResourceKind, reference: &str) -> Self {
        Self {
            status: 404,
            kind: ApiErrorKind::NotFound,
            resource,
            code: None,
            message: format!("{resource} {reference} does not exist"),
        }
    }

    /// Name conflict error for the given resource.
    #[must_use]
    pub fn name_in_use(resource: ResourceKind, name: &str) -> Self {
        Self {
            status: 422,
            kind: ApiErrorKind::NameInUse,
            resource,
            code: None,
            message: format!("{resource} name {name} is already in use"),
        }
    }

    /// Attaches the array's message code.
    #[must_use]
    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    /// Returns true when the referenced resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }

    /// Returns true when the name is already used by a live resource.
    #[must_use]
    pub fn is_name_in_use(&self) -> bool {
        self.kind == ApiErrorKind::NameInUse
    }

    /// Returns true when a referenced volume does not exist.
    #[must_use]
    pub fn volume_is_not_exist(&self) -> bool {
        self.is_not_found() && self.resource == ResourceKind::Volume
    }

    /// Returns true when a referenced snapshot does not exist.
    #[must_use]
    pub fn snapshot_is_not_exist(&self) -> bool {
        self.is_not_found() && self.resource == ResourceKind::Snapshot
    }

    /// Returns true when a volume name collides with a live volume.
    #[must_use]
    pub fn volume_name_is_already_use(&self) -> bool {
        self.is_name_in_use() && self.resource == ResourceKind::Volume
    }

    /// Returns true when a snapshot name collides with a live snapshot.
    #[must_use]
    pub fn snapshot_name_is_already_use(&self) -> bool {
        self.is_name_in_use() && self.resource == ResourceKind::Snapshot
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {}", self.message, self.status)?;
        if let Some(code) = &self.code {
            write!(f, ", code {code}")?;
        }
        f.write_str(")")
    }
}

impl std::error::Error for ApiError {}

/// Errors raised by array backends.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ArrayError {
    /// Classified failure reported by the management API.
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    /// Raised before sending when a request is missing a required value.
    #[error("invalid request: {0}")]
    Validation(String),
    /// Raised when the request could not be delivered or the response read.
    #[error("transport error: {message}")]
    Transport {
        /// Message from the HTTP client.
        message: String,
    },
    /// Raised when a response body does not match the expected shape.
    #[error("failed to decode {what}: {message}")]
    Decode {
        /// Payload being decoded.
        what: String,
        /// Parser error message.
        message: String,
    },
    /// Raised when the client configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ArrayError {
    /// Returns the classified API error, if this is one.
    #[must_use]
    pub const fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(api) => Some(api),
            _ => None,
        }
    }

    /// Returns true when this is an API not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_not_found)
    }

    /// Returns true when this is a volume not-found error.
    #[must_use]
    pub fn volume_is_not_exist(&self) -> bool {
        self.as_api().is_some_and(ApiError::volume_is_not_exist)
    }

    /// Returns true when this is a snapshot not-found error.
    #[must_use]
    pub fn snapshot_is_not_exist(&self) -> bool {
        self.as_api().is_some_and(ApiError::snapshot_is_not_exist)
    }

    /// Returns true when this is a volume name conflict.
    #[must_use]
    pub fn volume_name_is_already_use(&self) -> bool {
        self.as_api().is_some_and(ApiError::volume_name_is_already_use)
    }

    /// Returns true when this is a snapshot name conflict.
    #[must_use]
    pub fn snapshot_name_is_already_use(&self) -> bool {
        self.as_api()
            .is_some_and(ApiError::snapshot_name_is_already_use)
    }
}

impl From<ConfigError> for ArrayError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
