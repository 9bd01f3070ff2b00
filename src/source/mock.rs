//! Mock position source for testing and development

use std::collections::VecDeque;

use crate::core::RawFix;
use crate::source::{
    FixOptions, PermissionState, PositionSource, SourceError, SourceResult, StreamEvent,
    StreamHandle,
};
use crate::utils::clock::ManualClock;

/// Scripted position source.
///
/// One-shot responses and stream events are queued ahead of time and
/// consumed in order, so tests are deterministic. An optional latency
/// simulation advances a shared [`ManualClock`] on every one-shot call,
/// which is how the late-result discard path is exercised.
pub struct MockPositionSource {
    supported: bool,
    permission: PermissionState,
    once_script: VecDeque<SourceResult<RawFix>>,
    stream_queue: VecDeque<StreamEvent>,
    active_stream: Option<StreamHandle>,
    handle_counter: u32,
    once_calls: u32,
    stream_starts: u32,
    simulated: bool,
    latency: Option<(ManualClock, u64)>,
}

impl MockPositionSource {
    /// Create a supported, permission-granted source with empty scripts
    pub fn new() -> Self {
        Self {
            supported: true,
            permission: PermissionState::Granted,
            once_script: VecDeque::new(),
            stream_queue: VecDeque::new(),
            active_stream: None,
            handle_counter: 0,
            once_calls: 0,
            stream_starts: 0,
            simulated: false,
            latency: None,
        }
    }

    /// Script a successful one-shot fix
    pub fn push_fix(&mut self, fix: RawFix) {
        self.once_script.push_back(Ok(fix));
    }

    /// Script a one-shot provider error
    pub fn push_error(&mut self, code: i32, message: &str) {
        self.once_script.push_back(Err(SourceError::new(code, message)));
    }

    /// Queue a fix on the stream
    pub fn push_stream_fix(&mut self, fix: RawFix) {
        self.stream_queue.push_back(StreamEvent::Fix(fix));
    }

    /// Queue a provider error on the stream
    pub fn push_stream_error(&mut self, code: i32, message: &str) {
        self.stream_queue
            .push_back(StreamEvent::Error(SourceError::new(code, message)));
    }

    /// Mark the platform as having no positioning capability
    pub fn set_supported(&mut self, supported: bool) {
        self.supported = supported;
    }

    /// Simulate the user denying the location permission
    pub fn deny_permission(&mut self) {
        self.permission = PermissionState::Denied;
    }

    /// Flag delivered fixes as coming from a simulated data layer,
    /// which keeps them out of the cache
    pub fn mark_simulated(&mut self, simulated: bool) {
        self.simulated = simulated;
    }

    /// Advance the given clock by `latency_ms` on every one-shot call,
    /// simulating a slow provider
    pub fn with_latency(mut self, clock: ManualClock, latency_ms: u64) -> Self {
        self.latency = Some((clock, latency_ms));
        self
    }

    /// Number of one-shot calls made so far
    pub fn once_call_count(&self) -> u32 {
        self.once_calls
    }

    /// Number of stream subscriptions opened so far
    pub fn stream_start_count(&self) -> u32 {
        self.stream_starts
    }

    /// Whether a stream subscription is currently open
    pub fn stream_active(&self) -> bool {
        self.active_stream.is_some()
    }
}

impl Default for MockPositionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionSource for MockPositionSource {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn permission(&self) -> PermissionState {
        self.permission
    }

    fn get_once(&mut self, _options: &FixOptions) -> SourceResult<RawFix> {
        self.once_calls += 1;

        if let Some((clock, latency_ms)) = &self.latency {
            clock.advance_ms(*latency_ms);
        }

        match self.once_script.pop_front() {
            Some(Ok(mut fix)) => {
                if self.simulated {
                    fix.mocked = true;
                }
                Ok(fix)
            }
            Some(Err(error)) => Err(error),
            // Script exhausted: behave like a device with no signal
            None => Err(SourceError::new(2, "no scripted fix available")),
        }
    }

    fn start_stream(&mut self, _options: &FixOptions) -> SourceResult<StreamHandle> {
        self.handle_counter += 1;
        self.stream_starts += 1;
        let handle = StreamHandle::new(self.handle_counter);
        self.active_stream = Some(handle);
        Ok(handle)
    }

    fn poll_stream(&mut self, handle: StreamHandle) -> Vec<StreamEvent> {
        if self.active_stream != Some(handle) {
            return Vec::new();
        }

        let mut events: Vec<StreamEvent> = self.stream_queue.drain(..).collect();
        if self.simulated {
            for event in &mut events {
                if let StreamEvent::Fix(fix) = event {
                    fix.mocked = true;
                }
            }
        }
        events
    }

    fn stop_stream(&mut self, handle: StreamHandle) {
        if self.active_stream == Some(handle) {
            self.active_stream = None;
            self.stream_queue.clear();
        }
    }
}
