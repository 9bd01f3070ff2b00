//! Aggregate configuration with validation and JSON file loading

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::types::{AcquisitionConfig, WatchOptions};
use crate::cache::CacheConfig;
use crate::calibration::CalibrationConfig;

/// Configuration problems detected at load or validation time
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A parameter holds a value outside its valid range
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file could not be read
    IoError { message: String },
    /// Configuration file could not be parsed
    ParseError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "invalid {parameter} = {value}: {reason}")
            }
            ConfigError::IoError { message } => write!(f, "config file I/O error: {message}"),
            ConfigError::ParseError { message } => write!(f, "config parse error: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Full configuration for the location core.
///
/// Defaults reproduce the tuned production values; a deployment can
/// override any subset via a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub acquisition: AcquisitionConfig,
    pub cache: CacheConfig,
    pub calibration: CalibrationConfig,
    pub watch: WatchOptions,
}

impl LocatorConfig {
    /// Load and validate a configuration file
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: e.to_string(),
        })?;
        let config: LocatorConfig =
            serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants the type system cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_ms == 0 {
            return Err(invalid("cache.ttl_ms", "0", "must be positive"));
        }
        if self.cache.max_accuracy_m <= 0.0 {
            return Err(invalid(
                "cache.max_accuracy_m",
                &self.cache.max_accuracy_m.to_string(),
                "must be positive",
            ));
        }

        let cal = &self.calibration;
        for (name, value) in [
            ("calibration.min_candidate_score", cal.min_candidate_score),
            ("calibration.confidence_threshold", cal.confidence_threshold),
            (
                "calibration.priority_confidence_threshold",
                cal.priority_confidence_threshold,
            ),
            ("calibration.ambiguity_margin", cal.ambiguity_margin),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(name, &value.to_string(), "must be within [0, 1]"));
            }
        }
        if cal.priority_confidence_threshold > cal.confidence_threshold {
            return Err(invalid(
                "calibration.priority_confidence_threshold",
                &cal.priority_confidence_threshold.to_string(),
                "relaxed bar cannot exceed the normal threshold",
            ));
        }
        if cal.indoor_radius_multiplier < 1.0 {
            return Err(invalid(
                "calibration.indoor_radius_multiplier",
                &cal.indoor_radius_multiplier.to_string(),
                "must not shrink radii",
            ));
        }

        if self.watch.error_threshold == 0 {
            return Err(invalid("watch.error_threshold", "0", "must be at least 1"));
        }

        let acq = &self.acquisition;
        if acq.retry_max_accuracy_m.len() != acq.retry_maximum_age_ms.len() {
            return Err(invalid(
                "acquisition.retry_max_accuracy_m",
                &acq.retry_max_accuracy_m.len().to_string(),
                "retry schedules must have matching lengths",
            ));
        }
        let mut previous = acq.validation.max_accuracy_m.unwrap_or(0.0);
        for value in &acq.retry_max_accuracy_m {
            if *value < previous {
                return Err(invalid(
                    "acquisition.retry_max_accuracy_m",
                    &value.to_string(),
                    "retries must relax the accuracy gate, not tighten it",
                ));
            }
            previous = *value;
        }

        Ok(())
    }
}

fn invalid(parameter: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(LocatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = LocatorConfig::default();
        config.cache.ttl_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_out_of_unit_range_rejected() {
        let mut config = LocatorConfig::default();
        config.calibration.confidence_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_relaxed_bar_above_normal_rejected() {
        let mut config = LocatorConfig::default();
        config.calibration.priority_confidence_threshold = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tightening_retry_schedule_rejected() {
        let mut config = LocatorConfig::default();
        config.acquisition.retry_max_accuracy_m = vec![2_000.0, 1_000.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mismatched_retry_schedules_rejected() {
        let mut config = LocatorConfig::default();
        config.acquisition.retry_maximum_age_ms = vec![120_000];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_error_threshold_rejected() {
        let mut config = LocatorConfig::default();
        config.watch.error_threshold = 0;
        assert!(config.validate().is_err());
    }
}
