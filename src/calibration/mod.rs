//! Snap-to-landmark calibration

pub mod engine;
pub mod points;

pub use engine::{CalibrationConfig, CalibrationEngine, CalibrationResult, CandidateScore};
pub use points::{campus_reference_points, PointCategory, ReferencePoint};
