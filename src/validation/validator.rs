//! Fix validation against bounds, accuracy and geofences

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::RawFix;
use crate::geo::distance::distance_m;

/// Fixes above this latitude magnitude are implausible for a campus app
const EXTREME_LATITUDE_DEG: f64 = 85.0;

/// Fixes coarser than this are implausible regardless of configuration
const IMPLAUSIBLE_ACCURACY_M: f64 = 10_000.0;

/// A circular allowed region (geofence)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
}

/// Per-call validation parameters. Never mutated globally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Reject fixes coarser than this, when set (meters)
    pub max_accuracy_m: Option<f64>,
    /// When non-empty, the fix must fall within `radius + accuracy` of at
    /// least one region center
    pub allowed_regions: Vec<Region>,
    /// Slack widening the hard latitude range check (degrees)
    pub lat_bounds_slack_deg: f64,
    /// Slack widening the hard longitude range check (degrees)
    pub lon_bounds_slack_deg: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_accuracy_m: Some(500.0), // first-attempt gate; retries relax it
            allowed_regions: Vec::new(),
            lat_bounds_slack_deg: 0.0,
            lon_bounds_slack_deg: 0.0,
        }
    }
}

impl ValidationConfig {
    /// The same config with a different accuracy ceiling, used by the
    /// orchestrator's relaxed retries
    pub fn with_max_accuracy(&self, max_accuracy_m: f64) -> Self {
        Self {
            max_accuracy_m: Some(max_accuracy_m),
            ..self.clone()
        }
    }
}

/// Reason a fix was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    LatitudeOutOfRange { latitude: f64 },
    LongitudeOutOfRange { longitude: f64 },
    AccuracyAboveLimit { accuracy_m: f64, limit_m: f64 },
    OutsideAllowedRegions { nearest_distance_m: f64 },
    ExtremeLatitude { latitude: f64 },
    ImplausibleAccuracy { accuracy_m: f64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::LatitudeOutOfRange { latitude } => {
                write!(f, "latitude {latitude} outside [-90, 90]")
            }
            RejectReason::LongitudeOutOfRange { longitude } => {
                write!(f, "longitude {longitude} outside [-180, 180]")
            }
            RejectReason::AccuracyAboveLimit { accuracy_m, limit_m } => {
                write!(f, "accuracy {accuracy_m} m above limit {limit_m} m")
            }
            RejectReason::OutsideAllowedRegions { nearest_distance_m } => {
                write!(f, "fix outside every allowed region (nearest {nearest_distance_m:.0} m)")
            }
            RejectReason::ExtremeLatitude { latitude } => {
                write!(f, "implausible latitude {latitude}")
            }
            RejectReason::ImplausibleAccuracy { accuracy_m } => {
                write!(f, "implausible accuracy {accuracy_m} m")
            }
        }
    }
}

/// Assess a fix against the config, reporting the first rejection.
///
/// Deterministic: the same inputs always produce the same verdict.
pub fn assess(fix: &RawFix, config: &ValidationConfig) -> Result<(), RejectReason> {
    let lat_limit = 90.0 + config.lat_bounds_slack_deg;
    if !(-lat_limit..=lat_limit).contains(&fix.latitude) {
        return Err(RejectReason::LatitudeOutOfRange {
            latitude: fix.latitude,
        });
    }

    let lon_limit = 180.0 + config.lon_bounds_slack_deg;
    if !(-lon_limit..=lon_limit).contains(&fix.longitude) {
        return Err(RejectReason::LongitudeOutOfRange {
            longitude: fix.longitude,
        });
    }

    if fix.latitude.abs() > EXTREME_LATITUDE_DEG {
        return Err(RejectReason::ExtremeLatitude {
            latitude: fix.latitude,
        });
    }

    if fix.accuracy_m > IMPLAUSIBLE_ACCURACY_M {
        return Err(RejectReason::ImplausibleAccuracy {
            accuracy_m: fix.accuracy_m,
        });
    }

    if let Some(limit_m) = config.max_accuracy_m {
        if fix.accuracy_m > limit_m {
            return Err(RejectReason::AccuracyAboveLimit {
                accuracy_m: fix.accuracy_m,
                limit_m,
            });
        }
    }

    if !config.allowed_regions.is_empty() {
        let mut nearest = f64::INFINITY;
        let mut inside = false;
        for region in &config.allowed_regions {
            let distance =
                distance_m(fix.latitude, fix.longitude, region.latitude, region.longitude);
            nearest = nearest.min(distance);
            // Accuracy widens the fence: a coarse fix near the edge may
            // genuinely be inside
            if distance <= region.radius_m + fix.accuracy_m {
                inside = true;
                break;
            }
        }
        if !inside {
            return Err(RejectReason::OutsideAllowedRegions {
                nearest_distance_m: nearest,
            });
        }
    }

    Ok(())
}

/// Boolean verdict over [`assess`]; never panics
pub fn validate(fix: &RawFix, config: &ValidationConfig) -> bool {
    assess(fix, config).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_config() -> ValidationConfig {
        ValidationConfig {
            max_accuracy_m: None,
            ..ValidationConfig::default()
        }
    }

    #[test]
    fn test_accepts_ordinary_fix() {
        let fix = RawFix::new(23.029, 112.185, 30.0, 0);
        assert!(validate(&fix, &ValidationConfig::default()));
    }

    #[test]
    fn test_rejects_out_of_range_coordinates() {
        let config = open_config();
        assert!(!validate(&RawFix::new(90.5, 0.0, 10.0, 0), &config));
        assert!(!validate(&RawFix::new(-91.0, 0.0, 10.0, 0), &config));
        assert!(!validate(&RawFix::new(0.0, 180.5, 10.0, 0), &config));
        assert!(!validate(&RawFix::new(0.0, -181.0, 10.0, 0), &config));
    }

    #[test]
    fn test_bounds_slack_widens_the_range() {
        let mut config = open_config();
        config.lon_bounds_slack_deg = 1.0;
        // Datelines wrap; a provider reporting 180.5 is tolerable with
        // slack configured, while latitude stays guarded by the
        // implausibility check regardless
        assert!(validate(&RawFix::new(23.0, 180.5, 10.0, 0), &config));
        assert!(!validate(&RawFix::new(90.5, 112.0, 10.0, 0), &config));
    }

    #[test]
    fn test_accuracy_above_max_is_invalid() {
        let config = ValidationConfig {
            max_accuracy_m: Some(100.0),
            ..open_config()
        };
        assert!(!validate(&RawFix::new(23.0, 112.0, 100.1, 0), &config));
        assert!(validate(&RawFix::new(23.0, 112.0, 100.0, 0), &config));
    }

    #[test]
    fn test_implausible_fixes_rejected_without_config() {
        let config = open_config();
        assert!(!validate(&RawFix::new(86.0, 112.0, 10.0, 0), &config));
        assert!(!validate(&RawFix::new(-86.0, 112.0, 10.0, 0), &config));
        assert!(!validate(&RawFix::new(23.0, 112.0, 10_001.0, 0), &config));
    }

    #[test]
    fn test_geofence_requires_one_region() {
        let config = ValidationConfig {
            allowed_regions: vec![Region {
                latitude: 23.029221,
                longitude: 112.184995,
                radius_m: 500.0,
            }],
            ..open_config()
        };

        // On campus
        assert!(validate(&RawFix::new(23.0295, 112.1852, 20.0, 0), &config));
        // A few kilometers away
        assert!(!validate(&RawFix::new(23.1000, 112.3000, 20.0, 0), &config));
    }

    #[test]
    fn test_geofence_widened_by_accuracy() {
        let config = ValidationConfig {
            allowed_regions: vec![Region {
                latitude: 23.029221,
                longitude: 112.184995,
                radius_m: 100.0,
            }],
            ..open_config()
        };

        // ~550 m away: outside radius + 20 but inside radius + 600
        let just_outside = RawFix::new(23.0342, 112.1850, 20.0, 0);
        let coarse = RawFix::new(23.0342, 112.1850, 600.0, 0);
        assert!(!validate(&just_outside, &config));
        assert!(validate(&coarse, &config));
    }

    #[test]
    fn test_deterministic_verdict() {
        let fix = RawFix::new(23.0, 112.0, 50.0, 0);
        let config = ValidationConfig::default();
        let first = assess(&fix, &config);
        let second = assess(&fix, &config);
        assert_eq!(first, second);
    }
}
