use geo::Point;
use shiftgate_core::models::Coordinate;

/// Mean Earth radius used for the spherical approximation
pub const EARTH_MEAN_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two coordinates (haversine)
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let a: Point = a.into();
    let b: Point = b.into();

    let lat_a = a.y().to_radians();
    let lat_b = b.y().to_radians();
    let d_lat = lat_b - lat_a;
    let d_lng = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points
    let central_angle = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    EARTH_MEAN_RADIUS_METERS * central_angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Distance, Haversine};
    use proptest::prelude::*;

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| Coordinate::new(lat, lng))
    }

    #[test]
    fn test_known_distance_san_francisco() {
        let center = Coordinate::new(37.7749, -122.4194);
        let presidio = Coordinate::new(37.8200, -122.4785);

        let d = distance_meters(center, presidio);
        assert!((d - 7_219.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = distance_meters(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        let expected = EARTH_MEAN_RADIUS_METERS * 1.0f64.to_radians();
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_antipodal_points() {
        let d = distance_meters(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert!((d - EARTH_MEAN_RADIUS_METERS * std::f64::consts::PI).abs() < 1e-3);
    }

    #[test]
    fn test_agrees_with_geo_haversine() {
        let a = Coordinate::new(51.5007, -0.1246);
        let b = Coordinate::new(40.6892, -74.0445);

        let ours = distance_meters(a, b);
        let theirs = Haversine.distance(Point::from(a), Point::from(b));
        // geo uses a slightly larger mean radius (6,371,008.8 m)
        assert!(((ours - theirs) / theirs).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_distance_to_self_is_zero(a in coordinate()) {
            prop_assert_eq!(distance_meters(a, a), 0.0);
        }

        #[test]
        fn prop_distance_is_symmetric(a in coordinate(), b in coordinate()) {
            let ab = distance_meters(a, b);
            let ba = distance_meters(b, a);
            prop_assert!((ab - ba).abs() <= 1e-6 * ab.max(1.0));
        }

        #[test]
        fn prop_distance_is_bounded(a in coordinate(), b in coordinate()) {
            let d = distance_meters(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= EARTH_MEAN_RADIUS_METERS * std::f64::consts::PI + 1e-6);
        }
    }
}
