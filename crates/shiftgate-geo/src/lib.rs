//! Shiftgate Geo - Distance math and geofence admission
//!
//! Pure, deterministic functions: great-circle distance between coordinates
//! and the circular admission check against a site.

pub mod distance;
pub mod geofence;

pub use distance::{distance_meters, EARTH_MEAN_RADIUS_METERS};
pub use geofence::{GeofenceCheck, GeofenceValidator};
