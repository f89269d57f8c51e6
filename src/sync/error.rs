//! Error types for persistence and synchronization.

use thiserror::Error;

use crate::model::AnnotationKind;

/// An annotation cannot be persisted as it stands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No label assigned
    #[error("Annotation has no label")]
    MissingLabel,

    /// No authenticated user to attribute the annotation to
    #[error("No authenticated user")]
    MissingUser,

    /// No active image to attach the annotation to
    #[error("No active image")]
    MissingImage,
}

/// A stored record could not be turned into an annotation.
#[derive(Error, Debug)]
pub enum WireError {
    /// JSON structure did not match the record layout
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Shape `type` is not one we know
    #[error("Unknown shape type '{0}'")]
    UnknownShape(String),

    /// Coordinates do not fit the declared shape type
    #[error("Invalid coordinates for {kind:?}: {message}")]
    InvalidCoordinates {
        /// Declared shape type
        kind: AnnotationKind,
        /// Description of the problem
        message: String,
    },

    /// Required field is missing
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// Id does not have the canonical shape
    #[error("Not a canonical annotation id: '{0}'")]
    InvalidId(String),
}

impl WireError {
    /// Create an invalid coordinates error.
    pub fn invalid_coordinates(kind: AnnotationKind, message: impl Into<String>) -> Self {
        Self::InvalidCoordinates {
            kind,
            message: message.into(),
        }
    }

    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// A persistence call failed.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Rejected locally before any network call
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The backend could not be reached
    #[error("Network error: {message}")]
    Network {
        /// Description of the failure
        message: String,
    },

    /// The backend answered with an error
    #[error("Server error {status}: {message}")]
    Server {
        /// Status code reported by the backend
        status: u16,
        /// Error body or reason
        message: String,
    },

    /// The backend answered with a record we could not read
    #[error("Malformed response: {0}")]
    Malformed(#[from] WireError),
}

impl SyncError {
    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a server error.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }
}
