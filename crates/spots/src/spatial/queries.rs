//! Spatial query utilities for distance calculations.
//!
//! Uses the Haversine formula with a fixed spherical Earth so that the
//! activation thresholds behave identically on every platform.

use geo::Point;

/// Earth radius used by every distance in the hunt
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate Haversine distance between two points in meters
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    let phi1 = p1.y().to_radians();
    let phi2 = p2.y().to_radians();
    let delta_phi = (p2.y() - p1.y()).to_radians();
    let delta_lambda = (p2.x() - p1.x()).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_haversine_distance() {
        // Distance from NYC to LA is approximately 3,936 km
        let nyc = Point::new(-74.0060, 40.7128);
        let la = Point::new(-118.2437, 34.0522);

        let dist = haversine_distance(nyc, la);
        assert!((dist - 3_936_000.0).abs() < 50_000.0); // Within 50km
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let calicut = Point::new(75.7804, 11.2588);
        assert_eq!(haversine_distance(calicut, calicut), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let samples = [
            (Point::new(75.7804, 11.2588), Point::new(75.7814, 11.2598)),
            (Point::new(-179.9, 0.0), Point::new(179.9, 0.0)),
            (Point::new(0.0, 89.9), Point::new(180.0, -89.9)),
        ];

        for (a, b) in samples {
            assert_relative_eq!(haversine_distance(a, b), haversine_distance(b, a), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_millidegree_of_latitude() {
        let a = Point::new(75.7804, 11.2588);
        let b = Point::new(75.7804, 11.2598);

        // 0.001 degrees of latitude on a 6,371 km sphere
        assert_relative_eq!(haversine_distance(a, b), 111.19, epsilon = 0.01);
    }
}
