//! Port trait definitions
//!
//! These traits define the interfaces that adapters must implement.

pub mod clock;
pub mod location;

pub use clock::{Clock, ManualClock, SystemClock};
pub use location::{LocationSensor, PositionFix, PositionOptions, SensorError};
