use crate::models::Coordinates;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two optional locations
///
/// Returns `None` when either side has no coordinates, so callers can apply
/// their own missing-data policy.
#[inline]
pub fn distance_km(a: Option<Coordinates>, b: Option<Coordinates>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(haversine_distance(
            a.latitude,
            a.longitude,
            b.latitude,
            b.longitude,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Distance from London to Paris (approximately 344 km)
        let london_lat = 51.5074;
        let london_lon = -0.1278;
        let paris_lat = 48.8566;
        let paris_lon = 2.3522;

        let distance = haversine_distance(london_lat, london_lon, paris_lat, paris_lon);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let ensenada = Some(Coordinates::new(31.8667, -116.5964));
        let san_quintin = Some(Coordinates::new(30.5608, -115.9378));

        let there = distance_km(ensenada, san_quintin).unwrap();
        let back = distance_km(san_quintin, ensenada).unwrap();
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        let point = Some(Coordinates::new(31.87, -116.61));
        assert_eq!(distance_km(point, point), Some(0.0));
    }

    #[test]
    fn test_distance_missing_coordinates() {
        let point = Some(Coordinates::new(31.87, -116.61));
        assert_eq!(distance_km(None, point), None);
        assert_eq!(distance_km(point, None), None);
        assert_eq!(distance_km(None, None), None);
    }
}
