//! Human-readable formatting for display surfaces

/// Format a distance for display: "Nm" below a kilometer, "N.Nkm" above
pub fn format_distance(meters: f64) -> String {
    if meters < 1_000.0 {
        format!("{}m", meters.round() as i64)
    } else {
        format!("{:.1}km", meters / 1_000.0)
    }
}

/// Format a coordinate pair at the precision map pins actually need
pub fn format_coordinate(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.6}, {longitude:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_below_one_kilometer() {
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(42.4), "42m");
        assert_eq!(format_distance(999.0), "999m");
    }

    #[test]
    fn test_kilometers_from_one_kilometer_up() {
        assert_eq!(format_distance(1_000.0), "1.0km");
        assert_eq!(format_distance(1_250.0), "1.2km");
        assert_eq!(format_distance(12_340.0), "12.3km");
    }

    #[test]
    fn test_coordinate_precision() {
        assert_eq!(format_coordinate(23.029221, 112.184995), "23.029221, 112.184995");
    }
}
