//! WGS 84 coordinates as reported by location sensors.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShiftgateError};

/// A latitude/longitude pair in decimal degrees (WGS 84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Create a coordinate, rejecting values outside the WGS 84 ranges
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        let coordinate = Self::new(latitude, longitude);
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check that both components are finite and within range
    pub fn validate(&self) -> Result<()> {
        let reason = if !self.latitude.is_finite() || !self.longitude.is_finite() {
            Some("coordinates must be finite")
        } else if !(-90.0..=90.0).contains(&self.latitude) {
            Some("latitude must be within [-90, 90]")
        } else if !(-180.0..=180.0).contains(&self.longitude) {
            Some("longitude must be within [-180, 180]")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ShiftgateError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Point::new(c.longitude, c.latitude)
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(p: geo::Point<f64>) -> Self {
        Coordinate::new(p.y(), p.x())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_accepts_valid_range() {
        assert!(Coordinate::try_new(37.7749, -122.4194).is_ok());
        assert!(Coordinate::try_new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert!(matches!(
            Coordinate::try_new(91.0, 0.0),
            Err(ShiftgateError::InvalidCoordinate { .. })
        ));
        assert!(Coordinate::try_new(0.0, -180.5).is_err());
        assert!(Coordinate::try_new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_point_conversion_swaps_axes() {
        let c = Coordinate::new(37.7749, -122.4194);
        let p: geo::Point<f64> = c.into();
        assert_eq!(p.x(), -122.4194);
        assert_eq!(p.y(), 37.7749);
        assert_eq!(Coordinate::from(p), c);
    }
}
