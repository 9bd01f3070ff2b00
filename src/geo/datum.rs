//! Survey-datum to display-datum coordinate transform
//!
//! Map tiles served inside the covered territory use an obfuscated datum;
//! device fixes arrive in WGS-84. This module applies the standard
//! polynomial offset so the display layer can place markers correctly.
//! The transform is one-directional and not exactly invertible.

use crate::core::constants::{
    DATUM_LAT_MAX, DATUM_LAT_MIN, DATUM_LON_MAX, DATUM_LON_MIN, KRASOVSKY_ECCENTRICITY_SQ,
    KRASOVSKY_SEMI_MAJOR_AXIS_M,
};

/// Transform a WGS-84 coordinate into the local display datum.
///
/// Returns `(lon, lat)` unchanged for points outside the covered
/// territory's bounding box.
pub fn transform_datum(lon: f64, lat: f64) -> (f64, f64) {
    if out_of_territory(lon, lat) {
        return (lon, lat);
    }

    let d_lat = offset_lat(lon - 105.0, lat - 35.0);
    let d_lon = offset_lon(lon - 105.0, lat - 35.0);

    let rad_lat = lat / 180.0 * std::f64::consts::PI;
    let mut magic = rad_lat.sin();
    magic = 1.0 - KRASOVSKY_ECCENTRICITY_SQ * magic * magic;
    let sqrt_magic = magic.sqrt();

    let d_lat = (d_lat * 180.0)
        / ((KRASOVSKY_SEMI_MAJOR_AXIS_M * (1.0 - KRASOVSKY_ECCENTRICITY_SQ)) / (magic * sqrt_magic)
            * std::f64::consts::PI);
    let d_lon = (d_lon * 180.0)
        / (KRASOVSKY_SEMI_MAJOR_AXIS_M / sqrt_magic * rad_lat.cos() * std::f64::consts::PI);

    (lon + d_lon, lat + d_lat)
}

/// Whether a point falls outside the covered territory's bounding box
fn out_of_territory(lon: f64, lat: f64) -> bool {
    !(DATUM_LON_MIN..=DATUM_LON_MAX).contains(&lon) || !(DATUM_LAT_MIN..=DATUM_LAT_MAX).contains(&lat)
}

fn offset_lat(x: f64, y: f64) -> f64 {
    let pi = std::f64::consts::PI;
    let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * pi).sin() + 20.0 * (2.0 * x * pi).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * pi).sin() + 40.0 * (y / 3.0 * pi).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * pi).sin() + 320.0 * (y * pi / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn offset_lon(x: f64, y: f64) -> f64 {
    let pi = std::f64::consts::PI;
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * pi).sin() + 20.0 * (2.0 * x * pi).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * pi).sin() + 40.0 * (x / 3.0 * pi).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * pi).sin() + 300.0 * (x / 30.0 * pi).sin()) * 2.0 / 3.0;
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::distance::distance_m;

    #[test]
    fn test_identity_outside_territory() {
        // San Francisco, Sydney, Null Island: all untouched
        assert_eq!(transform_datum(-122.4194, 37.7749), (-122.4194, 37.7749));
        assert_eq!(transform_datum(151.2093, -33.8688), (151.2093, -33.8688));
        assert_eq!(transform_datum(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_identity_just_outside_bbox() {
        assert_eq!(transform_datum(73.65, 35.0), (73.65, 35.0));
        assert_eq!(transform_datum(135.06, 35.0), (135.06, 35.0));
        assert_eq!(transform_datum(100.0, 3.85), (100.0, 3.85));
        assert_eq!(transform_datum(100.0, 53.56), (100.0, 53.56));
    }

    #[test]
    fn test_offset_inside_territory() {
        // The campus sits inside the covered territory; the offset there
        // is a few hundred meters, never zero and never kilometers.
        let (lon, lat) = transform_datum(112.184995, 23.029221);
        assert_ne!((lon, lat), (112.184995, 23.029221));
        let shift = distance_m(23.029221, 112.184995, lat, lon);
        assert!(shift > 100.0 && shift < 1_000.0, "shift was {shift} m");
    }

    #[test]
    fn test_deterministic() {
        let a = transform_datum(116.3913, 39.9075);
        let b = transform_datum(116.3913, 39.9075);
        assert_eq!(a, b);
    }
}
