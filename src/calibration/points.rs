//! Static campus reference points used for calibration

use serde::{Deserialize, Serialize};

/// Broad category of a reference point, used by display surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointCategory {
    Library,
    Academic,
    Dining,
    Dormitory,
    Sports,
    Landmark,
}

/// A known campus landmark a fix can be snapped onto.
///
/// Static configuration; never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Display name, also used as the calibration source tag
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Nominal coverage radius (meters)
    pub radius_m: f64,
    /// Ranking priority, lower is higher
    pub priority: u8,
    /// Static score weight in [0, 1]
    pub weight: f64,
    pub category: PointCategory,
    /// Hard cap on the snap distance for this point (meters)
    pub calibration_distance_m: f64,
}

impl ReferencePoint {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
        priority: u8,
        weight: f64,
        category: PointCategory,
        calibration_distance_m: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            latitude,
            longitude,
            radius_m,
            priority,
            weight,
            category,
            calibration_distance_m,
        }
    }
}

/// The campus landmark set.
///
/// Weights and radii are empirically tuned against observed fix noise
/// around each building; treat them as product data, not geometry.
pub fn campus_reference_points() -> Vec<ReferencePoint> {
    vec![
        ReferencePoint::new(
            "Library",
            23.029_221,
            112.184_995,
            200.0,
            1,
            0.9,
            PointCategory::Library,
            350.0,
        ),
        ReferencePoint::new(
            "Teaching Building A",
            23.031_900,
            112.181_100,
            150.0,
            2,
            0.8,
            PointCategory::Academic,
            250.0,
        ),
        ReferencePoint::new(
            "Student Cafeteria",
            23.026_500,
            112.187_900,
            120.0,
            2,
            0.75,
            PointCategory::Dining,
            220.0,
        ),
        ReferencePoint::new(
            "Gymnasium",
            23.025_800,
            112.181_500,
            180.0,
            3,
            0.7,
            PointCategory::Sports,
            300.0,
        ),
        ReferencePoint::new(
            "Dormitory 3",
            23.032_800,
            112.189_200,
            160.0,
            4,
            0.6,
            PointCategory::Dormitory,
            260.0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::distance::distance_m;

    #[test]
    fn test_campus_points_are_well_formed() {
        let points = campus_reference_points();
        assert!(!points.is_empty());
        for point in &points {
            assert!((0.0..=1.0).contains(&point.weight), "{}", point.name);
            assert!(point.radius_m > 0.0);
            assert!(point.calibration_distance_m > 0.0);
        }
    }

    #[test]
    fn test_non_library_points_outside_priority_radius() {
        // The priority-point rule snaps anything within 350 m of the
        // Library; the other landmarks must sit beyond that or they
        // could never win a calibration.
        let points = campus_reference_points();
        let library = points.iter().find(|p| p.name == "Library").unwrap();
        for point in points.iter().filter(|p| p.name != "Library") {
            let d = distance_m(library.latitude, library.longitude, point.latitude, point.longitude);
            assert!(d > 350.0, "{} is only {d:.0} m from the Library", point.name);
        }
    }
}
