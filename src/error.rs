//! Error Types
//!
//! This module defines the error taxonomy shared by the user store, the
//! session manager, and the request pipeline.
//!
//! # Error Categories
//!
//! - `Validation` - Malformed input, recoverable by correcting the field
//! - `Conflict` - Duplicate identity, recoverable by choosing another one
//! - `InvalidCredentials` - Bad username/password, recoverable by retry
//! - `SessionExpired` - Surfaced once by the pipeline, triggers forced logout
//! - `Permission` / `NotFound` / `Server` / `Network` - Transport outcomes,
//!   surfaced to the caller and never retried here
//!
//! The request pipeline is the only place that reclassifies raw transport
//! failures into this taxonomy; everything else returns these values
//! directly. Nothing in this module panics.

use thiserror::Error;

/// Errors produced by the authentication core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Input failed a validation rule
    #[error("Validation error in field '{field}': {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// The identity being claimed already exists
    #[error("{message}")]
    Conflict {
        /// Human-readable error message
        message: String,
    },

    /// Username/password pair did not match any registered user
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The server rejected the bearer credential
    #[error("Your session has expired. Please login again.")]
    SessionExpired,

    /// Authenticated but not allowed
    #[error("You do not have permission to access this resource.")]
    Permission,

    /// The requested resource does not exist
    #[error("Resource not found.")]
    NotFound,

    /// 5xx response from the server
    #[error("Server error. Please try again later.")]
    Server {
        /// The status code that was returned
        status: u16,
    },

    /// The request never produced a response
    #[error("Network error: {message}")]
    Network {
        /// Human-readable error message
        message: String,
    },

    /// Any other non-success response
    #[error("Error {status}: {message}")]
    Generic {
        /// The status code that was returned
        status: u16,
        /// The status text that accompanied it
        message: String,
    },

    /// Persisted state could not be written
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable error message
        message: String,
    },

    /// JSON encoding or decoding failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Human-readable error message
        message: String,
    },
}

impl AuthError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status into a domain error
    ///
    /// `401` is deliberately absent from the plain mapping path in the
    /// pipeline, which handles it with session teardown before surfacing
    /// `SessionExpired`; it still maps correctly when called directly.
    pub fn from_status(status: u16, status_text: &str) -> Self {
        match status {
            400 => Self::validation("request", "Bad request. Please check your input."),
            401 => Self::SessionExpired,
            403 => Self::Permission,
            404 => Self::NotFound,
            409 => Self::conflict("Conflict. The resource already exists."),
            500..=599 => Self::Server { status },
            _ => Self::Generic {
                status,
                message: status_text.to_string(),
            },
        }
    }

    /// The HTTP status this error corresponds to, where one exists
    ///
    /// `Network`, `Storage`, and `Serialization` have no transport status.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(400),
            Self::Conflict { .. } => Some(409),
            Self::InvalidCredentials | Self::SessionExpired => Some(401),
            Self::Permission => Some(403),
            Self::NotFound => Some(404),
            Self::Server { status } | Self::Generic { status, .. } => Some(*status),
            Self::Network { .. } | Self::Storage { .. } | Self::Serialization { .. } => None,
        }
    }

    /// Whether the caller can recover by correcting input and retrying
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Conflict { .. } | Self::InvalidCredentials
        )
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON error: {}", err),
        }
    }
}
