//! Position source capability
//!
//! Abstraction over the device positioning provider. Implementations wrap
//! a platform API; the rest of the crate only sees this trait, so tests
//! and demos can script a [`MockPositionSource`] instead.

pub mod mock;

use serde::{Deserialize, Serialize};

pub use mock::MockPositionSource;

use crate::core::RawFix;

/// Result alias for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Provider-native error object.
///
/// Codes follow the W3C geolocation convention (1 permission denied,
/// 2 position unavailable, 3 timeout). Anything else is normalized to
/// `UNKNOWN_ERROR` by the error taxonomy; this struct is never inspected
/// directly outside `error.rs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceError {
    pub code: i32,
    pub message: String,
}

impl SourceError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Options for a fix request, one-shot or streaming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixOptions {
    /// Ask the provider for its most precise mode (GPS rather than
    /// network positioning)
    pub enable_high_accuracy: bool,
    /// Provider-side timeout for producing a fix (milliseconds)
    pub timeout_ms: u64,
    /// Oldest provider-cached fix the caller will accept (milliseconds)
    pub maximum_age_ms: u64,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 20_000, // matches the acquisition default
            maximum_age_ms: 0,  // fresh fix unless a retry relaxes this
        }
    }
}

/// Permission state of the positioning capability for this session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    Granted,
    Denied,
}

/// Handle identifying an open stream subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(u32);

impl StreamHandle {
    pub(crate) fn new(id: u32) -> Self {
        StreamHandle(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// One event delivered by a stream subscription
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A new raw fix arrived
    Fix(RawFix),
    /// The provider reported an error; the stream stays open
    Error(SourceError),
}

/// The positioning provider seam.
///
/// One-shot retrieval is synchronous with a provider-side timeout; the
/// streaming mode is pull-based: the tracker polls for queued events and
/// fans them out to its registered callbacks.
pub trait PositionSource: Send {
    /// Whether the platform has a positioning capability at all
    fn is_supported(&self) -> bool;

    /// Permission state for this session; deterministic until the user
    /// changes it outside the app
    fn permission(&self) -> PermissionState;

    /// Request a single fix, honoring the timeout in `options`
    fn get_once(&mut self, options: &FixOptions) -> SourceResult<RawFix>;

    /// Open a stream subscription
    fn start_stream(&mut self, options: &FixOptions) -> SourceResult<StreamHandle>;

    /// Drain events queued on the subscription since the last poll.
    /// Returns nothing for an unknown or closed handle.
    fn poll_stream(&mut self, handle: StreamHandle) -> Vec<StreamEvent>;

    /// Tear down a stream subscription; idempotent
    fn stop_stream(&mut self, handle: StreamHandle);
}
