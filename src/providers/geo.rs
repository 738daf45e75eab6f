use crate::constants::planar;
use crate::readings::GeoPoint;

/// Converts planar map offsets into geographic coordinates
///
/// `lon = (8260 + x / 1.18) / 1000`, `lat = (46730 - y / 1.72) / 1000`,
/// both rounded to three decimals.
pub fn planar_to_geographic(x: f64, y: f64) -> GeoPoint {
    let longitude = (planar::LON_ORIGIN + x / planar::X_SCALE) / planar::DEGREE_DIVISOR;
    let latitude = (planar::LAT_ORIGIN - y / planar::Y_SCALE) / planar::DEGREE_DIVISOR;

    GeoPoint {
        latitude: round_coordinate(latitude),
        longitude: round_coordinate(longitude),
    }
}

/// Rounds a coordinate to the published precision
pub fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(planar::COORDINATE_DECIMALS);
    (value * factor).round() / factor
}
