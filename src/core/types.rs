//! Core data types for the location core

use serde::{Deserialize, Serialize};

use crate::core::constants::{
    DEFAULT_REFERENCE_ACCURACY_M, DEFAULT_REFERENCE_LAT, DEFAULT_REFERENCE_LON,
};
use crate::error::ErrorKind;

/// A single point-in-time position reading from the position source.
///
/// Immutable once received; everything downstream derives from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFix {
    /// Latitude in decimal degrees (WGS-84)
    pub latitude: f64,
    /// Longitude in decimal degrees (WGS-84)
    pub longitude: f64,
    /// Reported accuracy radius (meters)
    pub accuracy_m: f64,
    /// Altitude above the ellipsoid (meters), if the source reports one
    pub altitude_m: Option<f64>,
    /// Heading in degrees clockwise from true north, if moving
    pub heading_deg: Option<f64>,
    /// Ground speed (meters per second), if moving
    pub speed_mps: Option<f64>,
    /// Fix timestamp (milliseconds since epoch)
    pub timestamp_ms: u64,
    /// Set when the fix came from a simulated data layer rather than a
    /// real device; such fixes are never cached
    #[serde(default)]
    pub mocked: bool,
}

impl RawFix {
    /// Create a minimal fix with only the mandatory fields set
    pub fn new(latitude: f64, longitude: f64, accuracy_m: f64, timestamp_ms: u64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m,
            altitude_m: None,
            heading_deg: None,
            speed_mps: None,
            timestamp_ms,
            mocked: false,
        }
    }
}

/// Confidence tier assigned by the calibration engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    /// Score cleared the full threshold with no ambiguity
    High,
    /// Snapped through the priority-point or relaxed gate
    Medium,
    /// Nearest-building fallback under poor accuracy
    Low,
}

impl Confidence {
    /// Accuracy cap (meters) reported for a location snapped at this tier
    pub fn accuracy_cap_m(&self) -> f64 {
        match self {
            Confidence::High => 20.0,
            Confidence::Medium => 40.0,
            Confidence::Low => 60.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// A fix after validation, calibration and fallback handling.
///
/// Exactly one of three states holds: a raw device fix (`!calibrated &&
/// !is_default`), a calibrated fix snapped onto a reference point
/// (`calibrated`, coordinates equal that point's), or the fixed default
/// reference (`is_default`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Accuracy radius (meters), capped after calibration
    pub accuracy_m: f64,
    /// Altitude above the ellipsoid (meters), carried from the raw fix
    pub altitude_m: Option<f64>,
    /// Heading in degrees, carried from the raw fix
    pub heading_deg: Option<f64>,
    /// Ground speed (meters per second), carried from the raw fix
    pub speed_mps: Option<f64>,
    /// Fix timestamp (milliseconds since epoch)
    pub timestamp_ms: u64,
    /// The fallback reference location was used
    pub is_default: bool,
    /// The fix was snapped onto a reference point
    pub calibrated: bool,
    /// Name of the reference point the fix was snapped to
    pub calibration_source: Option<String>,
    /// Confidence tier of the calibration, when calibrated
    pub confidence: Option<Confidence>,
    /// Winning weighted score, kept for diagnostics only
    pub weighted_score: Option<f64>,
    /// The location was served from the cache slot
    pub from_cache: bool,
    /// Error that pushed the workflow onto a fallback path, if any
    pub fallback_reason: Option<ErrorKind>,
    /// Carried from the raw fix; mocked locations are never cached
    #[serde(default)]
    pub mocked: bool,
}

impl ResolvedLocation {
    /// Wrap a validated raw fix without calibration
    pub fn from_fix(fix: &RawFix) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy_m: fix.accuracy_m,
            altitude_m: fix.altitude_m,
            heading_deg: fix.heading_deg,
            speed_mps: fix.speed_mps,
            timestamp_ms: fix.timestamp_ms,
            is_default: false,
            calibrated: false,
            calibration_source: None,
            confidence: None,
            weighted_score: None,
            from_cache: false,
            fallback_reason: None,
            mocked: fix.mocked,
        }
    }

    /// The fixed fallback reference location, stamped with the given time
    /// and the error that forced the fallback
    pub fn default_reference(timestamp_ms: u64, reason: Option<ErrorKind>) -> Self {
        Self {
            latitude: DEFAULT_REFERENCE_LAT,
            longitude: DEFAULT_REFERENCE_LON,
            accuracy_m: DEFAULT_REFERENCE_ACCURACY_M,
            altitude_m: None,
            heading_deg: None,
            speed_mps: None,
            timestamp_ms,
            is_default: true,
            calibrated: false,
            calibration_source: None,
            confidence: None,
            weighted_score: None,
            from_cache: false,
            fallback_reason: reason,
            mocked: false,
        }
    }

    /// Whether the cache store may persist this location
    pub fn cacheable(&self) -> bool {
        !self.is_default && !self.mocked
    }
}
