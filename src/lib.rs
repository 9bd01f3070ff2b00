//! Campus location core
//!
//! Position acquisition, validation, caching and calibration for the
//! campus activities client. Turns a noisy, slow, possibly-failing
//! device fix into a stable, campus-relevant location, snapped to a
//! known landmark when confidence is sufficient, with multi-level
//! fallback and continuous tracking.

pub mod api;
pub mod cache;
pub mod calibration;
pub mod core;
pub mod error;
pub mod geo;
pub mod source;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use api::{
    format_coordinate, format_distance, AcquireOptions, AcquisitionConfig, LocationTracker,
    PositionAcquirer, WatchOptions, WatchSession,
};
pub use cache::{CacheConfig, KeyValueStore, LocationCache, MemoryStore};
pub use calibration::{
    campus_reference_points, CalibrationConfig, CalibrationEngine, CalibrationResult,
    CandidateScore, PointCategory, ReferencePoint,
};
pub use crate::core::{Confidence, RawFix, ResolvedLocation};
pub use error::{ErrorKind, LocationError, LocationResult};
pub use geo::{distance_m, transform_datum};
pub use source::{
    FixOptions, MockPositionSource, PermissionState, PositionSource, SourceError, SourceResult,
    StreamEvent, StreamHandle,
};
pub use utils::{Clock, ConfigError, LocatorConfig, ManualClock, SystemClock};
pub use validation::{validate, Region, ValidationConfig};
