//! Volume resources and the requests that create them.

use serde::{Deserialize, Serialize};

use crate::error::ArrayError;

/// A block volume as reported by the array.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Volume {
    /// Server-assigned identifier.
    pub id: String,
    /// Unique name chosen by the client.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Identifier returned by create calls.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CreateResponse {
    /// Server-assigned identifier of the new resource.
    pub id: String,
}

/// Parameters required to create a volume.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct VolumeCreate {
    /// Unique volume name.
    pub name: String,
    /// Size in bytes; must be positive.
    pub size: u64,
    /// Optional free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VolumeCreate {
    /// Creates a volume request, trimming the name.
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into().trim().to_owned(),
            size,
            description: None,
        }
    }

    /// Sets the optional description.
    #[must_use]
    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into().trim().to_owned());
        self
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::Validation`] when the name is blank or the size is
    /// zero.
    pub fn validate(&self) -> Result<(), ArrayError> {
        if self.name.trim().is_empty() {
            return Err(ArrayError::Validation(String::from(
                "missing or empty field: name",
            )));
        }
        if self.size == 0 {
            return Err(ArrayError::Validation(String::from(
                "volume size must be a positive number of bytes",
            )));
        }
        Ok(())
    }
}

/// Parameters for cloning a volume from a snapshot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct VolumeClone {
    /// Unique name for the new volume.
    pub name: String,
    /// Optional free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VolumeClone {
    /// Creates a clone request, trimming the name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_owned(),
            description: None,
        }
    }

    /// Sets the optional description.
    #[must_use]
    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into().trim().to_owned());
        self
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
