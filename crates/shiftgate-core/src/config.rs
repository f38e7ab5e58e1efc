use crate::error::{Result, ShiftgateError};
use crate::models::RadiusPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Timing knobs for location acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationSettings {
    /// Cached coordinates younger than this are returned without a sensor query
    pub freshness: Duration,
    /// Timeout for the first, coarse fix attempt
    pub fast_timeout: Duration,
    /// Timeout for the fallback attempt
    pub fallback_timeout: Duration,
    /// Oldest platform-cached fix accepted by the fallback attempt
    pub fallback_max_age: Duration,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            freshness: Duration::from_secs(300),
            fast_timeout: Duration::from_millis(5_000),
            fallback_timeout: Duration::from_millis(15_000),
            fallback_max_age: Duration::from_secs(600),
        }
    }
}

/// Layered configuration for shiftgate
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub location_freshness_secs: ConfigValue<u64>,
    pub location_fast_timeout_ms: ConfigValue<u64>,
    pub location_fallback_timeout_ms: ConfigValue<u64>,
    pub location_fallback_max_age_secs: ConfigValue<u64>,
    pub site_min_radius_meters: ConfigValue<f64>,
    pub site_max_radius_meters: ConfigValue<f64>,
    pub site_cache_ttl_secs: ConfigValue<u64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let location = LocationSettings::default();
        let radius = RadiusPolicy::default();
        Self {
            location_freshness_secs: ConfigValue::new(
                location.freshness.as_secs(),
                ConfigSource::Default,
            ),
            location_fast_timeout_ms: ConfigValue::new(
                location.fast_timeout.as_millis() as u64,
                ConfigSource::Default,
            ),
            location_fallback_timeout_ms: ConfigValue::new(
                location.fallback_timeout.as_millis() as u64,
                ConfigSource::Default,
            ),
            location_fallback_max_age_secs: ConfigValue::new(
                location.fallback_max_age.as_secs(),
                ConfigSource::Default,
            ),
            site_min_radius_meters: ConfigValue::new(radius.min_meters, ConfigSource::Default),
            site_max_radius_meters: ConfigValue::new(radius.max_meters, ConfigSource::Default),
            site_cache_ttl_secs: ConfigValue::new(60, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ShiftgateError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| ShiftgateError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        let location = file_config.location.unwrap_or_default();
        from_file(&mut self.location_freshness_secs, location.freshness_secs);
        from_file(&mut self.location_fast_timeout_ms, location.fast_timeout_ms);
        from_file(&mut self.location_fallback_timeout_ms, location.fallback_timeout_ms);
        from_file(&mut self.location_fallback_max_age_secs, location.fallback_max_age_secs);

        let site = file_config.site.unwrap_or_default();
        from_file(&mut self.site_min_radius_meters, site.min_radius_meters);
        from_file(&mut self.site_max_radius_meters, site.max_radius_meters);
        from_file(&mut self.site_cache_ttl_secs, site.cache_ttl_secs);

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        env_override("SHIFTGATE_LOCATION_FRESHNESS_SECS", &mut self.location_freshness_secs);
        env_override("SHIFTGATE_LOCATION_FAST_TIMEOUT_MS", &mut self.location_fast_timeout_ms);
        env_override(
            "SHIFTGATE_LOCATION_FALLBACK_TIMEOUT_MS",
            &mut self.location_fallback_timeout_ms,
        );
        env_override(
            "SHIFTGATE_LOCATION_FALLBACK_MAX_AGE_SECS",
            &mut self.location_fallback_max_age_secs,
        );
        env_override("SHIFTGATE_SITE_MIN_RADIUS_METERS", &mut self.site_min_radius_meters);
        env_override("SHIFTGATE_SITE_MAX_RADIUS_METERS", &mut self.site_max_radius_meters);
        env_override("SHIFTGATE_SITE_CACHE_TTL_SECS", &mut self.site_cache_ttl_secs);
        self
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        let min = self.site_min_radius_meters.value;
        let max = self.site_max_radius_meters.value;
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 {
            return Err(ShiftgateError::ConfigInvalid {
                key: "site.min_radius_meters".to_string(),
                reason: "radius bounds must be positive".to_string(),
            });
        }
        if min > max {
            return Err(ShiftgateError::ConfigInvalid {
                key: "site.max_radius_meters".to_string(),
                reason: format!("max radius {} is below min radius {}", max, min),
            });
        }
        if self.location_fast_timeout_ms.value == 0 || self.location_fallback_timeout_ms.value == 0
        {
            return Err(ShiftgateError::ConfigInvalid {
                key: "location".to_string(),
                reason: "acquisition timeouts must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// Timings for sensor-backed callers of `LocationAcquisitionService`.
    /// The HTTP API receives device-reported fixes and does not use them.
    pub fn location_settings(&self) -> LocationSettings {
        LocationSettings {
            freshness: Duration::from_secs(self.location_freshness_secs.value),
            fast_timeout: Duration::from_millis(self.location_fast_timeout_ms.value),
            fallback_timeout: Duration::from_millis(self.location_fallback_timeout_ms.value),
            fallback_max_age: Duration::from_secs(self.location_fallback_max_age_secs.value),
        }
    }

    pub fn radius_policy(&self) -> RadiusPolicy {
        RadiusPolicy {
            min_meters: self.site_min_radius_meters.value,
            max_meters: self.site_max_radius_meters.value,
        }
    }

    pub fn site_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.site_cache_ttl_secs.value)
    }

    /// Every setting keyed by its TOML path, with the layer that supplied it
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        fn entry<T: ToString>(key: &str, v: &ConfigValue<T>) -> (String, (String, ConfigSource)) {
            (key.to_string(), (v.value.to_string(), v.source))
        }

        HashMap::from([
            entry("location.freshness_secs", &self.location_freshness_secs),
            entry("location.fast_timeout_ms", &self.location_fast_timeout_ms),
            entry("location.fallback_timeout_ms", &self.location_fallback_timeout_ms),
            entry("location.fallback_max_age_secs", &self.location_fallback_max_age_secs),
            entry("site.min_radius_meters", &self.site_min_radius_meters),
            entry("site.max_radius_meters", &self.site_max_radius_meters),
            entry("site.cache_ttl_secs", &self.site_cache_ttl_secs),
        ])
    }
}

fn from_file<T>(target: &mut ConfigValue<T>, value: Option<T>) {
    if let Some(value) = value {
        target.update(value, ConfigSource::File);
    }
}

fn env_override<T: FromStr>(var: &str, target: &mut ConfigValue<T>) {
    if let Ok(raw) = env::var(var) {
        match raw.trim().parse::<T>() {
            Ok(value) => target.update(value, ConfigSource::Environment),
            Err(_) => tracing::warn!("Invalid {} value '{}': expected a number", var, raw),
        }
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    location: Option<LocationSection>,
    site: Option<SiteSection>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct LocationSection {
    freshness_secs: Option<u64>,
    fast_timeout_ms: Option<u64>,
    fallback_timeout_ms: Option<u64>,
    fallback_max_age_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct SiteSection {
    min_radius_meters: Option<f64>,
    max_radius_meters: Option<f64>,
    cache_ttl_secs: Option<u64>,
}
