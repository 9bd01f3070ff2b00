//! Continuous tracking over the source's streaming mode
//!
//! Wraps a stream subscription with validation, cache upkeep and error
//! recovery. Call [`LocationTracker::process`] regularly; it drains the
//! stream, fans events out to the registered callbacks and drives the
//! pause/scheduled-resume cycle.

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::types::WatchOptions;
use crate::cache::LocationCache;
use crate::core::ResolvedLocation;
use crate::error::{ErrorKind, LocationError, LocationResult};
use crate::source::{FixOptions, PositionSource, StreamEvent, StreamHandle};
use crate::utils::clock::Clock;
use crate::validation::validate;

/// Callback invoked with every validated location update
pub type UpdateCallback = Box<dyn Fn(ResolvedLocation) + Send>;

/// Callback invoked with every normalized error
pub type ErrorCallback = Box<dyn Fn(LocationError) + Send>;

/// State of one tracking session
#[derive(Debug, Clone)]
pub struct WatchSession {
    pub id: u32,
    pub error_count: u32,
    pub paused: bool,
    pub resume_at_ms: u64,
    pub last_good_fix: Option<ResolvedLocation>,
}

struct ActiveWatch {
    session: WatchSession,
    handle: Option<StreamHandle>,
    options: WatchOptions,
    on_update: UpdateCallback,
    on_error: ErrorCallback,
}

/// Continuous tracker holding at most one active session.
///
/// Starting a new session while one is active stops the previous one
/// first; there are never two concurrent subscriptions on one tracker.
pub struct LocationTracker {
    source: Box<dyn PositionSource>,
    cache: LocationCache,
    clock: Arc<dyn Clock>,
    active: Option<ActiveWatch>,
    session_counter: u32,
}

impl LocationTracker {
    pub fn new(
        source: Box<dyn PositionSource>,
        cache: LocationCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            cache,
            clock,
            active: None,
            session_counter: 0,
        }
    }

    /// Start a tracking session, returning its id.
    ///
    /// Any session already active is stopped first.
    pub fn start(
        &mut self,
        options: WatchOptions,
        on_update: UpdateCallback,
        on_error: ErrorCallback,
    ) -> LocationResult<u32> {
        if self.active.is_some() {
            self.stop();
        }

        let fix_options = Self::fix_options(&options);
        let handle = self
            .source
            .start_stream(&fix_options)
            .map_err(|e| LocationError::from_source(&e, self.clock.now_ms()))?;

        self.session_counter += 1;
        let id = self.session_counter;
        self.active = Some(ActiveWatch {
            session: WatchSession {
                id,
                error_count: 0,
                paused: false,
                resume_at_ms: 0,
                last_good_fix: None,
            },
            handle: Some(handle),
            options,
            on_update,
            on_error,
        });
        debug!(session = id, "watch session started");
        Ok(id)
    }

    /// Pump the stream: validate fixes, fan out callbacks, drive
    /// pause/resume. Returns the number of events handled.
    pub fn process(&mut self) -> usize {
        let Self {
            source,
            cache,
            clock,
            active,
            ..
        } = self;
        let Some(active) = active.as_mut() else {
            return 0;
        };
        let now = clock.now_ms();

        if active.session.paused {
            if now < active.session.resume_at_ms {
                return 0;
            }
            // Recovery delay elapsed: restart the subscription
            match source.start_stream(&Self::fix_options(&active.options)) {
                Ok(handle) => {
                    active.handle = Some(handle);
                    active.session.paused = false;
                    active.session.error_count = 0;
                    info!(session = active.session.id, "watch session resumed");
                }
                Err(_) => {
                    active.session.resume_at_ms = now + active.options.recovery_delay_ms;
                    return 0;
                }
            }
        }

        let Some(handle) = active.handle else {
            return 0;
        };

        let mut handled = 0;
        for event in source.poll_stream(handle) {
            handled += 1;
            match event {
                StreamEvent::Fix(fix) => {
                    if !validate(&fix, &active.options.validation) {
                        // Invalid fixes are reported, never forwarded
                        (active.on_error)(LocationError::new(
                            ErrorKind::LocationValidationFailed,
                            now,
                        ));
                        continue;
                    }
                    active.session.error_count = 0;
                    let location = ResolvedLocation::from_fix(&fix);
                    cache.set(&location);
                    active.session.last_good_fix = Some(location.clone());
                    (active.on_update)(location);
                }
                StreamEvent::Error(source_error) => {
                    active.session.error_count += 1;
                    (active.on_error)(LocationError::from_source(&source_error, now));

                    if active.session.error_count >= active.options.error_threshold {
                        info!(
                            session = active.session.id,
                            errors = active.session.error_count,
                            "error threshold reached, pausing watch for recovery"
                        );
                        source.stop_stream(handle);
                        active.handle = None;
                        active.session.paused = true;
                        active.session.resume_at_ms = now + active.options.recovery_delay_ms;
                        // Remaining events belong to the torn-down
                        // subscription; drop them
                        break;
                    }
                }
            }
        }
        handled
    }

    /// Stop the session from any state. Returns the last good fix, if
    /// one was seen.
    pub fn stop(&mut self) -> Option<ResolvedLocation> {
        let active = self.active.take()?;
        if let Some(handle) = active.handle {
            self.source.stop_stream(handle);
        }
        debug!(session = active.session.id, "watch session stopped");
        active.session.last_good_fix
    }

    /// Whether a session is active (running or paused)
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the active session is paused for recovery
    pub fn is_paused(&self) -> bool {
        self.active
            .as_ref()
            .map(|a| a.session.paused)
            .unwrap_or(false)
    }

    /// Id of the active session
    pub fn session_id(&self) -> Option<u32> {
        self.active.as_ref().map(|a| a.session.id)
    }

    fn fix_options(options: &WatchOptions) -> FixOptions {
        FixOptions {
            enable_high_accuracy: options.enable_high_accuracy,
            ..FixOptions::default()
        }
    }
}
