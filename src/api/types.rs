//! Common API types for acquisition and tracking

use serde::{Deserialize, Serialize};

use crate::validation::ValidationConfig;

/// Options for a one-shot acquisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquireOptions {
    /// Ask the provider for its most precise mode
    pub enable_high_accuracy: bool,
    /// Per-attempt timeout (milliseconds)
    pub timeout_ms: u64,
    /// Oldest provider-cached fix accepted on the first attempt
    /// (milliseconds); retries widen this on their own
    pub maximum_age_ms: u64,
    /// Invalidate the cache slot before acquiring (manual refresh)
    pub force_refresh: bool,
    /// Surface the raw error instead of falling back to the default
    /// reference. Debug contexts only; UI callers always want a location.
    pub allow_error: bool,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 20_000,
            maximum_age_ms: 0,
            force_refresh: false,
            allow_error: false,
        }
    }
}

/// Retry relaxation schedule and validation baseline for acquisition.
///
/// Each retry widens the accuracy gate and the accepted fix age instead
/// of repeating the same request; under poor signal this trades precision
/// for a much higher success rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Validation applied to the first attempt
    pub validation: ValidationConfig,
    /// Accuracy ceiling per retry (meters); length bounds the retry count
    pub retry_max_accuracy_m: Vec<f64>,
    /// Accepted fix age per retry (milliseconds); same length as above
    pub retry_maximum_age_ms: Vec<u64>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            retry_max_accuracy_m: vec![1_000.0, 2_000.0],
            retry_maximum_age_ms: vec![120_000, 300_000],
        }
    }
}

impl AcquisitionConfig {
    /// Number of retries after the initial attempt
    pub fn max_retries(&self) -> usize {
        self.retry_max_accuracy_m.len().min(self.retry_maximum_age_ms.len())
    }
}

/// Options for a continuous tracking session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchOptions {
    /// Ask the provider for its most precise mode
    pub enable_high_accuracy: bool,
    /// Consecutive provider errors before the session pauses
    pub error_threshold: u32,
    /// Pause length before the stream is restarted (milliseconds)
    pub recovery_delay_ms: u64,
    /// Validation applied to every incoming fix
    pub validation: ValidationConfig,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            error_threshold: 3,
            recovery_delay_ms: 10_000,
            validation: ValidationConfig::default(),
        }
    }
}
