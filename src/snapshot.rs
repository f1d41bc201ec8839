//! Snapshot resources and the request that creates them.

use serde::{Deserialize, Serialize};

use crate::error::ArrayError;

/// A point-in-time snapshot of a volume.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Snapshot {
    /// Server-assigned identifier.
    pub id: String,
    /// Unique snapshot name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Identifier of the volume the snapshot was taken from.
    pub parent_id: String,
    /// Size in bytes, inherited from the parent volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Parameters required to snapshot a volume.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SnapshotCreate {
    /// Unique snapshot name.
    pub name: String,
    /// Free-text description.
    pub description: String,
}

impl SnapshotCreate {
    /// Creates a snapshot request, trimming string fields.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_owned(),
            description: description.into().trim().to_owned(),
        }
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Validation`] when the name is blank.
    pub fn validate(&self) -> Result<(), ArrayError> {
        if self.name.trim().is_empty() {
            return Err(ArrayError::Validation(String::from(
                "missing or empty field: name",
            )));
        }
        Ok(())
    }
}
