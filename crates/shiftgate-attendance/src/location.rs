//! Location acquisition with caching and a two-tier fallback.
//!
//! Clock-in and clock-out are interactive, so acquisition favours a quick
//! coarse fix. A cached coordinate younger than the freshness threshold is
//! returned without touching the sensor. Otherwise the sensor is asked for a
//! low-accuracy fix with a short timeout, and if that fails, once more with a
//! longer timeout that accepts an older platform-cached fix. A permission
//! refusal ends acquisition immediately.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shiftgate_core::config::{LayeredConfig, LocationSettings};
use shiftgate_core::error::{Result, ShiftgateError};
use shiftgate_core::models::Coordinate;
use shiftgate_core::ports::{Clock, LocationSensor, PositionFix, PositionOptions, SensorError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Anything that can produce the caller's current coordinate
#[async_trait]
pub trait Locate: Send + Sync {
    async fn acquire(&self) -> Result<Coordinate>;
}

/// A fix the caller's device has already acquired and reported with the request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportedLocation(Coordinate);

impl ReportedLocation {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        Ok(Self(Coordinate::try_new(latitude, longitude)?))
    }

    pub fn coordinate(&self) -> Coordinate {
        self.0
    }
}

#[async_trait]
impl Locate for ReportedLocation {
    async fn acquire(&self) -> Result<Coordinate> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedFix {
    coordinate: Coordinate,
    acquired_at: DateTime<Utc>,
}

/// Obtains a best-effort coordinate from a platform sensor within a bounded time
pub struct LocationAcquisitionService<S: LocationSensor> {
    sensor: S,
    settings: LocationSettings,
    clock: Arc<dyn Clock>,
    cache: Mutex<Option<CachedFix>>,
}

impl<S: LocationSensor> LocationAcquisitionService<S> {
    pub fn new(sensor: S, settings: LocationSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            sensor,
            settings,
            clock,
            cache: Mutex::new(None),
        }
    }

    /// Build with the `location.*` timings from layered configuration
    pub fn from_config(sensor: S, config: &LayeredConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(sensor, config.location_settings(), clock))
    }

    pub fn settings(&self) -> &LocationSettings {
        &self.settings
    }

    /// The cached coordinate, if it is still within the freshness threshold
    pub fn cached(&self) -> Option<Coordinate> {
        let cached = (*self.cache.lock().unwrap_or_else(|e| e.into_inner()))?;
        let age = (self.clock.now() - cached.acquired_at).to_std().ok()?;
        (age < self.settings.freshness).then_some(cached.coordinate)
    }

    pub fn clear_cache(&self) {
        *self.cache.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Options for the first attempt: coarse, quick, no platform-cached fixes
    pub fn fast_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: false,
            timeout: self.settings.fast_timeout,
            maximum_age: Duration::ZERO,
        }
    }

    /// Options for the retry: longer wait, older platform-cached fixes accepted
    pub fn fallback_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: false,
            timeout: self.settings.fallback_timeout,
            maximum_age: self.settings.fallback_max_age,
        }
    }

    pub async fn acquire(&self) -> Result<Coordinate> {
        if let Some(coordinate) = self.cached() {
            tracing::debug!("Using cached location fix");
            return Ok(coordinate);
        }

        let fast = self.fast_options();
        let failure = match self.attempt(&fast).await {
            Ok(fix) => return Ok(self.remember(fix)),
            Err(SensorError::PermissionDenied) => return Err(ShiftgateError::PermissionDenied),
            Err(e) => e,
        };

        tracing::warn!(error = %failure, "Fast location fix failed, retrying with relaxed options");

        let fallback = self.fallback_options();
        match self.attempt(&fallback).await {
            Ok(fix) => Ok(self.remember(fix)),
            Err(SensorError::PermissionDenied) => Err(ShiftgateError::PermissionDenied),
            Err(e) => {
                tracing::warn!(error = %e, "Location fallback failed");
                Err(ShiftgateError::LocationUnavailable { reason: e.to_string() })
            }
        }
    }

    /// One sensor request, bounded by its own timeout even if the sensor ignores it
    async fn attempt(&self, options: &PositionOptions) -> std::result::Result<PositionFix, SensorError> {
        let fix = match tokio::time::timeout(options.timeout, self.sensor.current_position(options)).await {
            Ok(result) => result?,
            Err(_) => return Err(SensorError::Timeout),
        };

        fix.coordinate
            .validate()
            .map_err(|e| SensorError::Unavailable(format!("sensor reported {}", e)))?;
        Ok(fix)
    }

    fn remember(&self, fix: PositionFix) -> Coordinate {
        // A platform-cached fix keeps its own age
        let acquired_at = fix.captured_at.min(self.clock.now());
        *self.cache.lock().unwrap_or_else(|e| e.into_inner()) = Some(CachedFix {
            coordinate: fix.coordinate,
            acquired_at,
        });
        fix.coordinate
    }
}

#[async_trait]
impl<S: LocationSensor> Locate for LocationAcquisitionService<S> {
    async fn acquire(&self) -> Result<Coordinate> {
        LocationAcquisitionService::acquire(self).await
    }
}
