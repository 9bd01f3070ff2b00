//! Closed location error taxonomy and formatter
//!
//! Every failure the location core can surface is one of the kinds below.
//! Provider-native error objects and internal failures are normalized
//! through a single constructor, so callers never inspect raw provider
//! codes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::source::SourceError;

/// Result alias for operations that surface a [`LocationError`]
pub type LocationResult<T> = Result<T, LocationError>;

/// The closed set of location error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The user denied the location permission
    PermissionDenied,
    /// The device could not produce a fix
    PositionUnavailable,
    /// The fix request timed out
    Timeout,
    /// The platform has no position source at all
    GeolocationNotSupported,
    /// A fix was produced but rejected by validation
    LocationValidationFailed,
    /// The location subsystem failed to initialize
    InitializationFailed,
    /// A location upload to the backend failed
    UploadFailed,
    /// Anything that does not map onto the kinds above
    UnknownError,
}

impl ErrorKind {
    /// Map a provider-native numeric code onto a kind.
    ///
    /// Codes follow the W3C geolocation convention; anything unrecognized
    /// becomes [`ErrorKind::UnknownError`] rather than an error.
    pub fn from_provider_code(code: i32) -> Self {
        match code {
            1 => ErrorKind::PermissionDenied,
            2 => ErrorKind::PositionUnavailable,
            3 => ErrorKind::Timeout,
            _ => ErrorKind::UnknownError,
        }
    }

    /// Stable string code used in logs and serialized diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::PositionUnavailable => "POSITION_UNAVAILABLE",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::GeolocationNotSupported => "GEOLOCATION_NOT_SUPPORTED",
            ErrorKind::LocationValidationFailed => "LOCATION_VALIDATION_FAILED",
            ErrorKind::InitializationFailed => "INITIALIZATION_FAILED",
            ErrorKind::UploadFailed => "UPLOAD_FAILED",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Fixed user-facing message for this kind
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => "Location permission was denied",
            ErrorKind::PositionUnavailable => "Current position is unavailable",
            ErrorKind::Timeout => "Locating timed out",
            ErrorKind::GeolocationNotSupported => "This device does not support positioning",
            ErrorKind::LocationValidationFailed => "The reported position failed validation",
            ErrorKind::InitializationFailed => "The location service failed to start",
            ErrorKind::UploadFailed => "Failed to upload the location",
            ErrorKind::UnknownError => "An unknown location error occurred",
        }
    }

    /// Fixed recovery suggestion for this kind
    pub fn suggestion(&self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => {
                "Enable location access for this app in system settings"
            }
            ErrorKind::PositionUnavailable => {
                "Move to an open area or check that location services are on"
            }
            ErrorKind::Timeout => "Check signal conditions and try again",
            ErrorKind::GeolocationNotSupported => "Pick your building manually from the list",
            ErrorKind::LocationValidationFailed => {
                "The fix looked implausible; retrying usually resolves this"
            }
            ErrorKind::InitializationFailed => "Restart the app and try again",
            ErrorKind::UploadFailed => "Check the network connection and retry",
            ErrorKind::UnknownError => "Try again; contact support if this keeps happening",
        }
    }

    /// Warning-grade kinds degrade the result without blocking it
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorKind::LocationValidationFailed | ErrorKind::UploadFailed)
    }
}

/// A normalized location error with its fixed message/suggestion pair.
///
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationError {
    pub kind: ErrorKind,
    pub message: String,
    pub suggestion: String,
    pub is_warning: bool,
    pub timestamp_ms: u64,
}

impl LocationError {
    /// Build an error of the given kind with its fixed texts attached
    pub fn new(kind: ErrorKind, timestamp_ms: u64) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            suggestion: kind.suggestion().to_string(),
            is_warning: kind.is_warning(),
            timestamp_ms,
        }
    }

    /// Normalize a provider-native error object.
    ///
    /// This is the single entry point for provider errors; it never panics
    /// and maps anything malformed onto [`ErrorKind::UnknownError`].
    pub fn from_source(error: &SourceError, timestamp_ms: u64) -> Self {
        Self::new(ErrorKind::from_provider_code(error.code), timestamp_ms)
    }
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.kind.as_str(), self.message, self.suggestion)
    }
}

impl std::error::Error for LocationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_code_mapping() {
        assert_eq!(ErrorKind::from_provider_code(1), ErrorKind::PermissionDenied);
        assert_eq!(ErrorKind::from_provider_code(2), ErrorKind::PositionUnavailable);
        assert_eq!(ErrorKind::from_provider_code(3), ErrorKind::Timeout);
    }

    #[test]
    fn test_malformed_codes_become_unknown() {
        assert_eq!(ErrorKind::from_provider_code(0), ErrorKind::UnknownError);
        assert_eq!(ErrorKind::from_provider_code(4), ErrorKind::UnknownError);
        assert_eq!(ErrorKind::from_provider_code(-1), ErrorKind::UnknownError);
        assert_eq!(ErrorKind::from_provider_code(i32::MAX), ErrorKind::UnknownError);
    }

    #[test]
    fn test_from_source_attaches_fixed_texts() {
        let source = SourceError {
            code: 3,
            message: "native timeout".to_string(),
        };
        let err = LocationError::from_source(&source, 42);
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(err.message, ErrorKind::Timeout.message());
        assert_eq!(err.timestamp_ms, 42);
        assert!(!err.is_warning);
    }

    #[test]
    fn test_validation_failure_is_warning() {
        let err = LocationError::new(ErrorKind::LocationValidationFailed, 0);
        assert!(err.is_warning);
    }

    #[test]
    fn test_display_contains_code_and_suggestion() {
        let err = LocationError::new(ErrorKind::PermissionDenied, 0);
        let text = err.to_string();
        assert!(text.contains("PERMISSION_DENIED"));
        assert!(text.contains(ErrorKind::PermissionDenied.suggestion()));
    }
}
