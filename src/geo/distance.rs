//! Great-circle distance on the spherical Earth model

use crate::core::constants::EARTH_RADIUS_M;

/// Haversine great-circle distance between two points (meters).
///
/// Pure function: symmetric in its arguments and zero at equal points.
/// Adequate for campus-scale distances where the spherical model error
/// is far below fix accuracy.
pub fn distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_at_equal_points() {
        assert_eq!(distance_m(23.029221, 112.184995, 23.029221, 112.184995), 0.0);
        assert_eq!(distance_m(0.0, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(distance_m(-45.5, 170.2, -45.5, 170.2), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let d1 = distance_m(23.029221, 112.184995, 23.030000, 112.186000);
        let d2 = distance_m(23.030000, 112.186000, 23.029221, 112.184995);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance() {
        // One degree of latitude is close to 111.2 km on the sphere
        let d = distance_m(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 100.0);
    }

    #[test]
    fn test_campus_scale() {
        // Roughly 15 m apart near the campus library
        let d = distance_m(23.029221, 112.184995, 23.029321, 112.184895);
        assert!(d > 5.0 && d < 30.0);
    }
}
