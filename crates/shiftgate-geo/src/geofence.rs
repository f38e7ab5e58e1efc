use serde::Serialize;
use shiftgate_core::error::{Result, ShiftgateError};
use shiftgate_core::models::{Coordinate, Site};

use crate::distance::distance_meters;

/// Outcome of checking a point against a site's admission circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceCheck {
    pub admitted: bool,
    pub distance_meters: f64,
    pub allowed_radius: f64,
}

impl GeofenceCheck {
    /// Turn a rejected check into a `GeofenceViolation` carrying the distances
    pub fn into_result(self) -> Result<()> {
        if self.admitted {
            Ok(())
        } else {
            Err(ShiftgateError::GeofenceViolation {
                distance_meters: self.distance_meters,
                allowed_radius_meters: self.allowed_radius,
            })
        }
    }
}

/// Circular geofence: a point is admitted when it lies within the site radius
#[derive(Debug, Clone, Copy, Default)]
pub struct GeofenceValidator;

impl GeofenceValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn admit(&self, point: Coordinate, site: &Site) -> bool {
        self.explain(point, site).admitted
    }

    pub fn explain(&self, point: Coordinate, site: &Site) -> GeofenceCheck {
        let distance = distance_meters(point, site.location);
        GeofenceCheck {
            admitted: distance <= site.radius_meters,
            distance_meters: distance,
            allowed_radius: site.radius_meters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::EARTH_MEAN_RADIUS_METERS;
    use chrono::Utc;
    use shiftgate_core::models::SiteId;

    fn site(radius: f64) -> Site {
        Site {
            id: SiteId::new(),
            name: "Healthcare Center A".to_string(),
            address: "1 Market St".to_string(),
            location: Coordinate::new(37.7749, -122.4194),
            radius_meters: radius,
            updated_at: Utc::now(),
        }
    }

    /// Point `meters` due north of the site center
    fn north_of(site: &Site, meters: f64) -> Coordinate {
        let d_lat = (meters / EARTH_MEAN_RADIUS_METERS).to_degrees();
        Coordinate::new(site.location.latitude + d_lat, site.location.longitude)
    }

    #[test]
    fn test_center_is_always_admitted() {
        let validator = GeofenceValidator::new();
        for radius in [100.0, 2000.0, 10_000.0] {
            let s = site(radius);
            assert!(validator.admit(s.location, &s));
        }
    }

    #[test]
    fn test_radius_plus_one_meter_is_rejected() {
        let validator = GeofenceValidator::new();
        let s = site(2000.0);

        let check = validator.explain(north_of(&s, 2001.0), &s);
        assert!(!check.admitted);
        assert!((check.distance_meters - 2001.0).abs() < 0.01);
        assert_eq!(check.allowed_radius, 2000.0);

        assert!(validator.admit(north_of(&s, 1999.0), &s));
    }

    #[test]
    fn test_rejection_maps_to_geofence_violation() {
        let s = site(2000.0);
        let check = GeofenceValidator::new().explain(Coordinate::new(37.82, -122.4785), &s);

        match check.into_result() {
            Err(ShiftgateError::GeofenceViolation { distance_meters, allowed_radius_meters }) => {
                assert!((distance_meters - 7_219.0).abs() < 5.0);
                assert_eq!(allowed_radius_meters, 2000.0);
            }
            other => panic!("expected GeofenceViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_nearby_point_is_admitted() {
        let s = site(2000.0);
        let check = GeofenceValidator::new().explain(Coordinate::new(37.7755, -122.4200), &s);
        assert!(check.admitted);
        assert!(check.distance_meters < 100.0);
        assert!(check.into_result().is_ok());
    }
}
