//! Physical constants and fixed system parameters

/// Mean Earth radius used by the haversine distance (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Semi-major axis of the Krasovsky 1940 ellipsoid used by the datum
/// transform (meters)
pub const KRASOVSKY_SEMI_MAJOR_AXIS_M: f64 = 6_378_245.0;

/// First eccentricity squared of the Krasovsky 1940 ellipsoid
pub const KRASOVSKY_ECCENTRICITY_SQ: f64 = 0.006_693_421_622_965_943_23;

/// Bounding box of the territory covered by the datum transform.
/// Points outside pass through unchanged.
pub const DATUM_LON_MIN: f64 = 73.66;
pub const DATUM_LON_MAX: f64 = 135.05;
pub const DATUM_LAT_MIN: f64 = 3.86;
pub const DATUM_LAT_MAX: f64 = 53.55;

/// Key under which the single cache slot is persisted in the key-value store
pub const CACHE_SLOT_KEY: &str = "campus_locator.last_fix";

/// Coordinates of the campus main gate, used as the fixed fallback
/// reference when every acquisition path has failed
pub const DEFAULT_REFERENCE_LAT: f64 = 23.028_500;
pub const DEFAULT_REFERENCE_LON: f64 = 112.185_500;

/// Accuracy reported for the fallback reference location (meters).
/// Coarse on purpose so callers can tell it apart from a live fix.
pub const DEFAULT_REFERENCE_ACCURACY_M: f64 = 500.0;
