use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::models::Coordinate;

/// Options passed to the platform sensor for a single position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Ask for a GPS-grade fix instead of a coarse network fix
    pub high_accuracy: bool,
    /// How long the sensor may take to produce a fix
    pub timeout: Duration,
    /// Oldest platform-cached fix the sensor may return instead of a new one
    pub maximum_age: Duration,
}

/// A position reported by the sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub coordinate: Coordinate,
    pub accuracy_meters: Option<f64>,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("permission to read location was denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("timed out waiting for a position fix")]
    Timeout,
}

/// Port for a platform location sensor
#[async_trait]
pub trait LocationSensor: Send + Sync {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> std::result::Result<PositionFix, SensorError>;
}
