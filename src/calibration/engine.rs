//! Snap-to-landmark calibration engine
//!
//! Blends distance and per-point static weight into a score, then applies
//! the special-case rules that encode how fixes actually behave on this
//! campus: degraded indoor accuracy widens every radius, very poor fixes
//! collapse to "near building X", and the library gets preferential
//! treatment because it dominates real usage.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calibration::points::ReferencePoint;
use crate::core::{Confidence, RawFix, ResolvedLocation};
use crate::geo::distance::distance_m;

/// Calibration tunables.
///
/// The thresholds are empirically tuned values carried over from field
/// observation; change them only with product input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Accuracy beyond which the fix is treated as indoors (meters)
    pub indoor_accuracy_threshold_m: f64,
    /// Radius widening applied to every point for indoor fixes
    pub indoor_radius_multiplier: f64,
    /// Accuracy beyond which the nearest-building shortcut applies (meters)
    pub nearest_fallback_accuracy_m: f64,
    /// Maximum nearest-building snap distance (meters)
    pub nearest_fallback_distance_m: f64,
    /// Name of the designated priority point, when there is one
    pub priority_point: Option<String>,
    /// Direct-snap radius around the priority point (meters)
    pub priority_snap_radius_m: f64,
    /// Candidates below this weighted score are dropped outright
    pub min_candidate_score: f64,
    /// Weighted score a winner must clear
    pub confidence_threshold: f64,
    /// Relaxed score bar for the priority point
    pub priority_confidence_threshold: f64,
    /// Minimum lead over the runner-up; closer is ambiguous
    pub ambiguity_margin: f64,
    /// Ranking bonus added to the priority point's score during sorting
    pub priority_bonus: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            indoor_accuracy_threshold_m: 30.0,
            indoor_radius_multiplier: 2.0,
            nearest_fallback_accuracy_m: 50.0,
            nearest_fallback_distance_m: 300.0,
            priority_point: None,
            priority_snap_radius_m: 350.0,
            min_candidate_score: 0.3,
            confidence_threshold: 0.7,
            priority_confidence_threshold: 0.4,
            ambiguity_margin: 0.1,
            priority_bonus: 0.2,
        }
    }
}

/// Per-point diagnostic emitted with every calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub name: String,
    pub distance_m: f64,
    pub effective_radius_m: f64,
    pub distance_score: f64,
    pub weighted_score: f64,
    /// Weighted score plus the priority bonus, used for ordering only
    pub ranking_score: f64,
    pub priority: u8,
}

/// Outcome of a calibration attempt.
///
/// `location.calibrated` tells whether a snap happened; `candidates`
/// always lists every point's scores for diagnostics.
#[derive(Debug, Clone)]
pub struct CalibrationResult {
    pub location: ResolvedLocation,
    pub candidates: Vec<CandidateScore>,
}

/// The calibration engine over a static reference point set
pub struct CalibrationEngine {
    points: Vec<ReferencePoint>,
    config: CalibrationConfig,
}

impl CalibrationEngine {
    pub fn new(points: Vec<ReferencePoint>, config: CalibrationConfig) -> Self {
        Self { points, config }
    }

    /// Engine preloaded with the campus landmark set, with the Library
    /// designated as the priority point
    pub fn campus() -> Self {
        Self::new(
            crate::calibration::points::campus_reference_points(),
            CalibrationConfig {
                priority_point: Some("Library".to_string()),
                ..CalibrationConfig::default()
            },
        )
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn points(&self) -> &[ReferencePoint] {
        &self.points
    }

    /// Attempt to snap a validated fix onto a reference point.
    ///
    /// The rule order is deliberate and mirrors observed campus behavior:
    /// nearest-building shortcut before the priority rule before scoring.
    /// Which rule should dominate in their overlap zones is an open
    /// product question; do not reorder without confirming intent.
    pub fn calibrate(&self, fix: &RawFix) -> CalibrationResult {
        let indoor = fix.accuracy_m > self.config.indoor_accuracy_threshold_m;
        let candidates = self.score_points(fix, indoor);

        // Low-accuracy fixes mean "somewhere near building X"; scoring
        // them precisely would be false precision
        if fix.accuracy_m > self.config.nearest_fallback_accuracy_m {
            if let Some(nearest) = self.nearest_point(fix) {
                let distance = distance_m(fix.latitude, fix.longitude, nearest.latitude, nearest.longitude);
                if distance <= self.config.nearest_fallback_distance_m {
                    debug!(point = %nearest.name, distance_m = distance, "nearest-building fallback snap");
                    return CalibrationResult {
                        location: self.snap(fix, nearest, Confidence::Low, None),
                        candidates,
                    };
                }
            }
        }

        // The priority point is disproportionately likely to be the true
        // location, so it claims everything inside its extended radius
        if let Some(point) = self.priority_point() {
            let distance = distance_m(fix.latitude, fix.longitude, point.latitude, point.longitude);
            if distance <= self.config.priority_snap_radius_m {
                debug!(point = %point.name, distance_m = distance, "priority-point snap");
                let score = candidates
                    .iter()
                    .find(|c| c.name == point.name)
                    .map(|c| c.weighted_score);
                return CalibrationResult {
                    location: self.snap(fix, point, Confidence::Medium, score),
                    candidates,
                };
            }
        }

        if let Some(winner) = self.rank(&candidates) {
            if let Some(point) = self.points.iter().find(|p| p.name == winner.name) {
                let confidence = if winner.weighted_score >= self.config.confidence_threshold {
                    Confidence::High
                } else {
                    Confidence::Medium
                };
                debug!(point = %point.name, score = winner.weighted_score, "scored calibration snap");
                return CalibrationResult {
                    location: self.snap(fix, point, confidence, Some(winner.weighted_score)),
                    candidates,
                };
            }
        }

        debug!(candidate_count = candidates.len(), "no calibration winner, fix kept as-is");
        CalibrationResult {
            location: ResolvedLocation::from_fix(fix),
            candidates,
        }
    }

    /// Score every reference point against the fix
    fn score_points(&self, fix: &RawFix, indoor: bool) -> Vec<CandidateScore> {
        self.points
            .iter()
            .map(|point| {
                let distance = distance_m(fix.latitude, fix.longitude, point.latitude, point.longitude);
                let effective_radius = if indoor {
                    point.radius_m * self.config.indoor_radius_multiplier
                } else {
                    point.radius_m
                };
                let distance_score = (1.0 - distance / effective_radius).max(0.0);
                let weighted_score = distance_score * point.weight;
                let ranking_score = if self.is_priority(point) {
                    weighted_score + self.config.priority_bonus
                } else {
                    weighted_score
                };
                CandidateScore {
                    name: point.name.clone(),
                    distance_m: distance,
                    effective_radius_m: effective_radius,
                    distance_score,
                    weighted_score,
                    ranking_score,
                    priority: point.priority,
                }
            })
            .collect()
    }

    /// Pick the scoring winner, or nothing when every gate fails
    fn rank(&self, candidates: &[CandidateScore]) -> Option<CandidateScore> {
        let mut in_range: Vec<&CandidateScore> = candidates
            .iter()
            .filter(|c| c.distance_score > 0.0 && c.weighted_score > self.config.min_candidate_score)
            .collect();
        if in_range.is_empty() {
            return None;
        }

        in_range.sort_by(|a, b| {
            b.ranking_score
                .partial_cmp(&a.ranking_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.priority.cmp(&b.priority))
                .then(
                    a.distance_m
                        .partial_cmp(&b.distance_m)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });

        let best = in_range[0];
        let point = self.points.iter().find(|p| p.name == best.name)?;

        let threshold = if self.is_priority(point) {
            self.config.priority_confidence_threshold
        } else {
            self.config.confidence_threshold
        };
        if best.weighted_score < threshold {
            return None;
        }

        // Two near-equal candidates mean the fix genuinely sits between
        // buildings; snapping either would oscillate
        if let Some(second) = in_range.get(1) {
            if best.ranking_score - second.ranking_score < self.config.ambiguity_margin {
                return None;
            }
        }

        if best.distance_m > point.calibration_distance_m {
            return None;
        }

        Some(best.clone())
    }

    /// Snap the fix onto the point's exact coordinates
    fn snap(
        &self,
        fix: &RawFix,
        point: &ReferencePoint,
        confidence: Confidence,
        weighted_score: Option<f64>,
    ) -> ResolvedLocation {
        let mut location = ResolvedLocation::from_fix(fix);
        location.latitude = point.latitude;
        location.longitude = point.longitude;
        location.accuracy_m = fix.accuracy_m.min(confidence.accuracy_cap_m());
        location.calibrated = true;
        location.calibration_source = Some(point.name.clone());
        location.confidence = Some(confidence);
        location.weighted_score = weighted_score;
        location
    }

    fn nearest_point(&self, fix: &RawFix) -> Option<&ReferencePoint> {
        self.points.iter().min_by(|a, b| {
            let da = distance_m(fix.latitude, fix.longitude, a.latitude, a.longitude);
            let db = distance_m(fix.latitude, fix.longitude, b.latitude, b.longitude);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    fn priority_point(&self) -> Option<&ReferencePoint> {
        let name = self.config.priority_point.as_deref()?;
        self.points.iter().find(|p| p.name == name)
    }

    fn is_priority(&self, point: &ReferencePoint) -> bool {
        self.config.priority_point.as_deref() == Some(point.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::points::PointCategory;

    fn point(name: &str, lat: f64, lon: f64, radius: f64, priority: u8, weight: f64) -> ReferencePoint {
        ReferencePoint::new(name, lat, lon, radius, priority, weight, PointCategory::Landmark, 500.0)
    }

    #[test]
    fn test_library_scenario_snaps_exactly() {
        let engine = CalibrationEngine::campus();
        let fix = RawFix::new(23.029_321, 112.184_895, 50.0, 0);

        let result = engine.calibrate(&fix);
        let location = result.location;
        assert!(location.calibrated);
        assert_eq!(location.calibration_source.as_deref(), Some("Library"));
        assert_eq!(location.latitude, 23.029_221);
        assert_eq!(location.longitude, 112.184_995);
        let confidence = location.confidence.unwrap();
        assert!(confidence == Confidence::High || confidence == Confidence::Medium);
    }

    #[test]
    fn test_idempotent_on_snapped_location() {
        let engine = CalibrationEngine::campus();
        let fix = RawFix::new(23.029_321, 112.184_895, 50.0, 0);
        let first = engine.calibrate(&fix).location;

        let again = RawFix::new(first.latitude, first.longitude, first.accuracy_m, 0);
        let second = engine.calibrate(&again).location;
        assert!(second.calibrated);
        assert_eq!(second.calibration_source, first.calibration_source);
        assert_eq!(second.latitude, first.latitude);
        assert_eq!(second.longitude, first.longitude);
    }

    #[test]
    fn test_high_confidence_scored_snap() {
        let engine = CalibrationEngine::campus();
        // ~15 m from Teaching Building A with sharp accuracy
        let fix = RawFix::new(23.032_000, 112.181_000, 20.0, 0);

        let location = engine.calibrate(&fix).location;
        assert!(location.calibrated);
        assert_eq!(location.calibration_source.as_deref(), Some("Teaching Building A"));
        assert_eq!(location.confidence, Some(Confidence::High));
        assert_eq!(location.accuracy_m, 20.0);
    }

    #[test]
    fn test_indoor_compensation_widens_radius() {
        let engine = CalibrationEngine::campus();
        // ~37 m from Teaching Building A: with accuracy 40 the widened
        // radius lifts the score over the threshold; with accuracy 25 the
        // narrow radius leaves it short
        let indoor = RawFix::new(23.031_900, 112.181_460, 40.0, 0);
        let outdoor = RawFix::new(23.031_900, 112.181_460, 25.0, 0);

        let snapped = engine.calibrate(&indoor).location;
        assert!(snapped.calibrated, "indoor fix should snap");
        assert_eq!(snapped.calibration_source.as_deref(), Some("Teaching Building A"));

        let kept = engine.calibrate(&outdoor).location;
        assert!(!kept.calibrated, "sharp fix at the same spot should not snap");
    }

    #[test]
    fn test_nearest_building_fallback_for_poor_accuracy() {
        let engine = CalibrationEngine::campus();
        // ~250 m north of the Gymnasium, accuracy worse than 50 m
        let fix = RawFix::new(23.028_048, 112.181_500, 80.0, 0);

        let location = engine.calibrate(&fix).location;
        assert!(location.calibrated);
        assert_eq!(location.calibration_source.as_deref(), Some("Gymnasium"));
        assert_eq!(location.confidence, Some(Confidence::Low));
        assert_eq!(location.accuracy_m, 60.0);
    }

    #[test]
    fn test_ambiguous_candidates_stay_uncalibrated() {
        let points = vec![
            point("North Hall", 23.031_0, 112.185_0, 400.0, 2, 0.9),
            point("South Hall", 23.030_0, 112.185_0, 400.0, 2, 0.9),
        ];
        let engine = CalibrationEngine::new(points, CalibrationConfig::default());
        // Dead center between the two halls
        let fix = RawFix::new(23.030_5, 112.185_0, 20.0, 0);

        let result = engine.calibrate(&fix);
        assert!(!result.location.calibrated);
        assert_eq!(result.candidates.len(), 2);
        assert!(result.candidates.iter().all(|c| c.weighted_score > 0.7));
    }

    #[test]
    fn test_priority_point_relaxed_threshold_beyond_snap_radius() {
        let points = vec![point("Main Hall", 23.030_0, 112.185_0, 800.0, 1, 0.9)];
        let config = CalibrationConfig {
            priority_point: Some("Main Hall".to_string()),
            ..CalibrationConfig::default()
        };
        let engine = CalibrationEngine::new(points, config);
        // ~400 m away: outside the 350 m direct-snap radius, weighted
        // score ~0.45, below 0.7 but above the relaxed 0.4 bar
        let fix = RawFix::new(23.033_6, 112.185_0, 20.0, 0);

        let location = engine.calibrate(&fix).location;
        assert!(location.calibrated);
        assert_eq!(location.confidence, Some(Confidence::Medium));
    }

    #[test]
    fn test_calibration_distance_cap_blocks_far_snap() {
        let mut p = point("Annex", 23.030_0, 112.185_0, 1_000.0, 2, 0.9);
        p.calibration_distance_m = 100.0;
        let engine = CalibrationEngine::new(vec![p], CalibrationConfig::default());
        // ~200 m away: score clears every gate except the distance cap
        let fix = RawFix::new(23.031_8, 112.185_0, 20.0, 0);

        let result = engine.calibrate(&fix);
        assert!(!result.location.calibrated);
        assert!(result.candidates[0].weighted_score > 0.7);
    }

    #[test]
    fn test_no_points_in_range_reports_candidates() {
        let engine = CalibrationEngine::campus();
        // Well off campus, sharp accuracy
        let fix = RawFix::new(23.100_0, 112.300_0, 15.0, 0);

        let result = engine.calibrate(&fix);
        assert!(!result.location.calibrated);
        assert_eq!(result.candidates.len(), engine.points().len());
        assert!(result.candidates.iter().all(|c| c.weighted_score == 0.0));
    }
}
