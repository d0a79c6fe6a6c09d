//! Shared Error Types
//!
//! Error taxonomy for the dashboard client. Every error that reaches a workflow
//! boundary is converted into a human-readable message through `user_message()`
//! and kept in that workflow's state rather than propagated further.
//!
//! # Error Categories
//!
//! - `LocationError` - device geolocation failures
//! - `ApiError` - HTTP failures talking to the rides backend
//! - `ValidationError` - form-level validation failures
//! - `StorageError` - session persistence failures
//! - `ClientError` - aggregate of the above plus configuration errors
//!
//! # Usage
//!
//! ```rust
//! use ridedash::shared::error::ValidationError;
//!
//! let error = ValidationError::new("password", "Passwords do not match");
//! assert_eq!(error.to_string(), "Passwords do not match");
//! ```
use thiserror::Error;

use crate::shared::config::ConfigError;

/// Failure to obtain a device position.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    /// The platform has no geolocation capability
    #[error("geolocation is not supported")]
    GeolocationUnavailable,

    /// The user denied the location permission
    #[error("location permission denied")]
    PermissionDenied,

    /// A position could not be determined
    #[error("position unavailable")]
    PositionUnavailable,

    /// No fix arrived within the requested timeout
    #[error("location request timed out")]
    Timeout,
}

impl LocationError {
    /// Map a platform geolocation error code (1 = permission denied,
    /// 2 = position unavailable, 3 = timeout).
    pub fn from_platform_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }

    /// Message shown by views that track the device position continuously.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::GeolocationUnavailable => "Geolocation is not supported by your device",
            Self::PermissionDenied => "Location permission denied. Please enable location services.",
            Self::PositionUnavailable => "Location information unavailable.",
            Self::Timeout => "Location request timed out.",
        }
    }
}

/// Failure of a request against the rides backend.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// The backend answered 401; the stored credential is no longer valid
    #[error("not authorized")]
    Unauthorized,

    /// Any other non-2xx response
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// `detail` (or `message`) from the response body, or a generic text
        message: String,
    },

    /// No response was received
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response whose body did not match the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// HTTP status behind this error, if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Status { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            Self::Status { message, .. } => message.clone(),
            Self::Network(_) => "Unable to reach the server. Please check your connection.".to_string(),
            Self::Decode(_) => "The server sent an unexpected response.".to_string(),
        }
    }
}

/// Form-level validation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure reading or writing the persisted session.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Aggregate error used at crate boundaries.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Location(e) => e.user_message().to_string(),
            Self::Api(e) => e.user_message(),
            Self::Validation(e) => e.message.clone(),
            Self::Config(e) => format!("Configuration error: {}", e),
            Self::Storage(e) => format!("Could not access saved session: {}", e),
        }
    }
}
