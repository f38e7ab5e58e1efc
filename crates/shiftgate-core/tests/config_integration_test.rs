//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! Environment variables > Config file > Defaults

use serial_test::serial;
use shiftgate_core::config::{ConfigSource, LayeredConfig};
use std::env;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

const VARS: [&str; 3] = [
    "SHIFTGATE_LOCATION_FRESHNESS_SECS",
    "SHIFTGATE_SITE_MAX_RADIUS_METERS",
    "SHIFTGATE_SITE_CACHE_TTL_SECS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    env::set_var("SHIFTGATE_LOCATION_FRESHNESS_SECS", "30");
    env::set_var("SHIFTGATE_SITE_MAX_RADIUS_METERS", "2500");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[location]
freshness_secs = 600

[site]
max_radius_meters = 8000.0
cache_ttl_secs = 15
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.location_freshness_secs.value, 30);
    assert_eq!(config.location_freshness_secs.source, ConfigSource::Environment);
    assert_eq!(config.site_max_radius_meters.value, 2500.0);
    assert_eq!(config.site_max_radius_meters.source, ConfigSource::Environment);
    // File value survives where no env var is set
    assert_eq!(config.site_cache_ttl(), Duration::from_secs(15));
    assert_eq!(config.site_cache_ttl_secs.source, ConfigSource::File);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_value_is_ignored() {
    clear_env();
    env::set_var("SHIFTGATE_SITE_CACHE_TTL_SECS", "soon");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.site_cache_ttl_secs.value, 60);
    assert_eq!(config.site_cache_ttl_secs.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_missing_file_is_reported() {
    clear_env();
    let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/shiftgate.toml");
    assert!(result.is_err());
}
