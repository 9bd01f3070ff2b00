//! One-shot position acquisition workflow
//!
//! Stage sequence per call: check cache, check support, check permission,
//! retrieve with adaptive retry, validate, calibrate, cache write, return.
//! Every stage has a fallback edge; the default contract is that the
//! caller always gets a location back, possibly approximate, possibly
//! flagged as the default reference, never an error.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::types::{AcquireOptions, AcquisitionConfig};
use crate::cache::LocationCache;
use crate::calibration::CalibrationEngine;
use crate::core::ResolvedLocation;
use crate::error::{ErrorKind, LocationError, LocationResult};
use crate::source::{FixOptions, PermissionState, PositionSource};
use crate::utils::clock::Clock;
use crate::validation::{validate, ValidationConfig};

/// Orchestrates one-shot acquisitions over the injected capabilities.
///
/// Issues at most one outstanding fix request at a time; retries are
/// sequential and each one relaxes the validation parameters instead of
/// repeating the same request.
pub struct PositionAcquirer {
    source: Box<dyn PositionSource>,
    cache: LocationCache,
    calibrator: CalibrationEngine,
    clock: Arc<dyn Clock>,
    config: AcquisitionConfig,
    acquisitions: u32,
    fallbacks: u32,
}

impl PositionAcquirer {
    /// Create an acquirer with the default retry schedule
    pub fn new(
        source: Box<dyn PositionSource>,
        cache: LocationCache,
        calibrator: CalibrationEngine,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_config(source, cache, calibrator, clock, AcquisitionConfig::default())
    }

    /// Create an acquirer with a custom retry schedule
    pub fn with_config(
        source: Box<dyn PositionSource>,
        cache: LocationCache,
        calibrator: CalibrationEngine,
        clock: Arc<dyn Clock>,
        config: AcquisitionConfig,
    ) -> Self {
        Self {
            source,
            cache,
            calibrator,
            clock,
            config,
            acquisitions: 0,
            fallbacks: 0,
        }
    }

    /// Acquire the current position.
    ///
    /// Resolves to a location in every case unless `options.allow_error`
    /// is set, in which case unrecoverable failures surface as the
    /// normalized [`LocationError`].
    pub fn get_current_position(
        &mut self,
        options: &AcquireOptions,
    ) -> LocationResult<ResolvedLocation> {
        self.acquisitions += 1;

        if options.force_refresh {
            debug!("manual refresh, invalidating cache slot");
            self.cache.clear();
        } else if let Some(hit) = self.cache.get(false) {
            debug!("strict cache hit, skipping acquisition");
            return Ok(hit);
        }

        // Support and permission are deterministic for the session, so
        // neither is ever retried
        if !self.source.is_supported() {
            return self.fall_back(ErrorKind::GeolocationNotSupported, options);
        }
        if self.source.permission() == PermissionState::Denied {
            return self.fall_back(ErrorKind::PermissionDenied, options);
        }

        let mut last_error = ErrorKind::PositionUnavailable;
        let attempts = 1 + self.config.max_retries();

        for attempt in 0..attempts {
            let fix_options = self.fix_options_for(attempt, options);
            let validation = self.validation_for(attempt);
            let deadline_ms = self.clock.now_ms() + fix_options.timeout_ms;

            match self.source.get_once(&fix_options) {
                Ok(fix) => {
                    // The timeout is a race, not an abort: a fix the
                    // provider delivers after the deadline is discarded
                    if self.clock.now_ms() > deadline_ms {
                        warn!(attempt, "provider resolved after the deadline, discarding fix");
                        last_error = ErrorKind::Timeout;
                        continue;
                    }
                    if !validate(&fix, &validation) {
                        debug!(attempt, "fix rejected by validation");
                        last_error = ErrorKind::LocationValidationFailed;
                        continue;
                    }

                    let location = self.calibrator.calibrate(&fix).location;
                    self.cache.set(&location);
                    return Ok(location);
                }
                Err(source_error) => {
                    let error = LocationError::from_source(&source_error, self.clock.now_ms());
                    match error.kind {
                        ErrorKind::PermissionDenied | ErrorKind::GeolocationNotSupported => {
                            return self.fall_back(error.kind, options);
                        }
                        kind => {
                            debug!(attempt, kind = kind.as_str(), "retryable retrieval failure");
                            last_error = kind;
                        }
                    }
                }
            }
        }

        self.fall_back(last_error, options)
    }

    /// (acquisitions, fallbacks) since construction
    pub fn statistics(&self) -> (u32, u32) {
        (self.acquisitions, self.fallbacks)
    }

    /// Fix options for the given attempt; retries widen the accepted age
    fn fix_options_for(&self, attempt: usize, options: &AcquireOptions) -> FixOptions {
        let maximum_age_ms = if attempt == 0 {
            options.maximum_age_ms
        } else {
            self.config.retry_maximum_age_ms[attempt - 1]
        };
        FixOptions {
            enable_high_accuracy: options.enable_high_accuracy,
            timeout_ms: options.timeout_ms,
            maximum_age_ms,
        }
    }

    /// Validation config for the given attempt; retries widen the
    /// accuracy ceiling
    fn validation_for(&self, attempt: usize) -> ValidationConfig {
        if attempt == 0 {
            self.config.validation.clone()
        } else {
            self.config
                .validation
                .with_max_accuracy(self.config.retry_max_accuracy_m[attempt - 1])
        }
    }

    /// Multi-level fallback: strict cache, then lenient cache, then the
    /// fixed default reference, with the triggering error attached
    fn fall_back(
        &mut self,
        kind: ErrorKind,
        options: &AcquireOptions,
    ) -> LocationResult<ResolvedLocation> {
        self.fallbacks += 1;
        let now = self.clock.now_ms();

        if options.allow_error {
            return Err(LocationError::new(kind, now));
        }

        // A strict entry may have become valid since the first check,
        // for example written by a concurrent watch session
        if let Some(mut hit) = self.cache.get(false) {
            warn!(reason = kind.as_str(), "falling back to fresh cache entry");
            hit.fallback_reason = Some(kind);
            return Ok(hit);
        }
        if let Some(mut hit) = self.cache.get(true) {
            warn!(reason = kind.as_str(), "falling back to degraded cache entry");
            hit.fallback_reason = Some(kind);
            return Ok(hit);
        }

        warn!(reason = kind.as_str(), "falling back to the default reference location");
        Ok(ResolvedLocation::default_reference(now, Some(kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::core::RawFix;
    use crate::source::MockPositionSource;
    use crate::utils::clock::ManualClock;

    fn acquirer_with(source: MockPositionSource, clock: &ManualClock) -> PositionAcquirer {
        let cache = LocationCache::new(Box::new(MemoryStore::new()), Arc::new(clock.clone()));
        PositionAcquirer::new(
            Box::new(source),
            cache,
            CalibrationEngine::campus(),
            Arc::new(clock.clone()),
        )
    }

    #[test]
    fn test_always_timeout_resolves_to_default() {
        let clock = ManualClock::at(1_000);
        let mut source = MockPositionSource::new();
        source.push_error(3, "timeout");
        source.push_error(3, "timeout");
        source.push_error(3, "timeout");
        let mut acquirer = acquirer_with(source, &clock);

        let location = acquirer
            .get_current_position(&AcquireOptions::default())
            .expect("fallback must resolve, never reject");
        assert!(location.is_default);
        assert_eq!(location.fallback_reason, Some(ErrorKind::Timeout));
    }

    #[test]
    fn test_retry_count_is_bounded() {
        let clock = ManualClock::at(1_000);
        let mut acquirer = acquirer_with(MockPositionSource::new(), &clock);

        // Empty script: every attempt reports position-unavailable
        let location = acquirer.get_current_position(&AcquireOptions::default()).unwrap();
        assert!(location.is_default);
        assert_eq!(location.fallback_reason, Some(ErrorKind::PositionUnavailable));
        let (acquisitions, fallbacks) = acquirer.statistics();
        assert_eq!((acquisitions, fallbacks), (1, 1));
    }

    #[test]
    fn test_successful_fix_is_calibrated_and_cached() {
        let clock = ManualClock::at(1_000);
        let mut source = MockPositionSource::new();
        // A sharp fix right by the Library
        source.push_fix(RawFix::new(23.029_321, 112.184_895, 20.0, 1_000));
        let mut acquirer = acquirer_with(source, &clock);

        let first = acquirer.get_current_position(&AcquireOptions::default()).unwrap();
        assert!(first.calibrated);
        assert_eq!(first.calibration_source.as_deref(), Some("Library"));
        assert!(!first.from_cache);

        // Second call is served from the cache without touching the source
        let second = acquirer.get_current_position(&AcquireOptions::default()).unwrap();
        assert!(second.from_cache);
        assert_eq!(second.latitude, first.latitude);
    }

    #[test]
    fn test_unsupported_platform_skips_retrieval() {
        let clock = ManualClock::at(1_000);
        let mut source = MockPositionSource::new();
        source.set_supported(false);
        source.push_fix(RawFix::new(23.029, 112.185, 20.0, 1_000));
        let mut acquirer = acquirer_with(source, &clock);

        let location = acquirer.get_current_position(&AcquireOptions::default()).unwrap();
        assert!(location.is_default);
        assert_eq!(location.fallback_reason, Some(ErrorKind::GeolocationNotSupported));
    }

    #[test]
    fn test_permission_denied_not_retried() {
        let clock = ManualClock::at(1_000);
        let mut source = MockPositionSource::new();
        source.deny_permission();
        let mut acquirer = acquirer_with(source, &clock);

        let location = acquirer.get_current_position(&AcquireOptions::default()).unwrap();
        assert!(location.is_default);
        assert_eq!(location.fallback_reason, Some(ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_retry_relaxes_accuracy_gate() {
        let clock = ManualClock::at(1_000);
        let mut source = MockPositionSource::new();
        // 600 m accuracy fails the 500 m first-attempt gate but passes
        // the 1000 m gate on the first retry
        source.push_fix(RawFix::new(23.050, 112.200, 600.0, 1_000));
        source.push_fix(RawFix::new(23.050, 112.200, 600.0, 1_000));
        let mut acquirer = acquirer_with(source, &clock);

        let location = acquirer.get_current_position(&AcquireOptions::default()).unwrap();
        assert!(!location.is_default);
        assert_eq!(location.accuracy_m, 600.0);
    }

    #[test]
    fn test_late_provider_result_is_discarded() {
        let clock = ManualClock::at(1_000);
        let mut source =
            MockPositionSource::new().with_latency(clock.clone(), 25_000);
        source.push_fix(RawFix::new(23.029, 112.185, 20.0, 1_000));
        source.push_fix(RawFix::new(23.029, 112.185, 20.0, 1_000));
        source.push_fix(RawFix::new(23.029, 112.185, 20.0, 1_000));
        let mut acquirer = acquirer_with(source, &clock);

        // 20 s timeout, 25 s simulated latency: every fix arrives late
        let location = acquirer.get_current_position(&AcquireOptions::default()).unwrap();
        assert!(location.is_default);
        assert_eq!(location.fallback_reason, Some(ErrorKind::Timeout));
    }

    #[test]
    fn test_allow_error_surfaces_raw_error() {
        let clock = ManualClock::at(1_000);
        let mut source = MockPositionSource::new();
        source.push_error(3, "timeout");
        source.push_error(3, "timeout");
        source.push_error(3, "timeout");
        let mut acquirer = acquirer_with(source, &clock);

        let options = AcquireOptions {
            allow_error: true,
            ..AcquireOptions::default()
        };
        let error = acquirer.get_current_position(&options).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Timeout);
    }

    #[test]
    fn test_stale_cache_serves_lenient_fallback() {
        let clock = ManualClock::at(1_000);
        let mut source = MockPositionSource::new();
        source.push_fix(RawFix::new(23.029_321, 112.184_895, 20.0, 1_000));
        let mut acquirer = acquirer_with(source, &clock);

        // Prime the cache, then let it expire
        acquirer.get_current_position(&AcquireOptions::default()).unwrap();
        clock.advance_ms(120_000);

        // Source script is exhausted now, so acquisition fails and the
        // stale entry is the best available answer
        let location = acquirer.get_current_position(&AcquireOptions::default()).unwrap();
        assert!(location.from_cache);
        assert!(!location.is_default);
        assert_eq!(location.fallback_reason, Some(ErrorKind::PositionUnavailable));
    }

    #[test]
    fn test_force_refresh_invalidates_cache() {
        let clock = ManualClock::at(1_000);
        let mut source = MockPositionSource::new();
        source.push_fix(RawFix::new(23.029_321, 112.184_895, 20.0, 1_000));
        let mut acquirer = acquirer_with(source, &clock);

        acquirer.get_current_position(&AcquireOptions::default()).unwrap();

        // Manual refresh drops the slot; with the script exhausted there
        // is no cache to fall back to either
        let options = AcquireOptions {
            force_refresh: true,
            ..AcquireOptions::default()
        };
        let location = acquirer.get_current_position(&options).unwrap();
        assert!(location.is_default);
    }
}
