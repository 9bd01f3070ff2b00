//! Public acquisition and tracking APIs
//!
//! The orchestrator serves one-shot "where am I" calls with the full
//! fallback chain; the tracker wraps the source's streaming mode for
//! continuous updates.

pub mod formatting;
pub mod orchestrator;
pub mod types;
pub mod watch;

pub use formatting::{format_coordinate, format_distance};
pub use orchestrator::PositionAcquirer;
pub use types::{AcquireOptions, AcquisitionConfig, WatchOptions};
pub use watch::{ErrorCallback, LocationTracker, UpdateCallback, WatchSession};
