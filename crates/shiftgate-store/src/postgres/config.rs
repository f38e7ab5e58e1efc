//! Connection settings for the Postgres adapter

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(String),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub pool: PoolConfig,
}

impl PostgresConfig {
    /// Reads `DATABASE_URL`, plus `SHIFTGATE_DB_MAX_CONNECTIONS` and
    /// `SHIFTGATE_DB_ACQUIRE_TIMEOUT_SECS` when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?;

        let mut config = Self::from_database_url(&url)?;
        if let Some(max) = env_number("SHIFTGATE_DB_MAX_CONNECTIONS")? {
            config.pool.max_connections = max as u32;
            config.pool.min_connections = config.pool.min_connections.min(config.pool.max_connections);
        }
        if let Some(secs) = env_number("SHIFTGATE_DB_ACQUIRE_TIMEOUT_SECS")? {
            config.pool.acquire_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_database_url(database_url: &str) -> Result<Self, ConfigError> {
        let config = Self {
            database_url: database_url.trim().to_string(),
            pool: PoolConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheme_ok = ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.database_url.starts_with(scheme));
        if !scheme_ok {
            return Err(invalid("database_url", "expected a postgres:// or postgresql:// URL"));
        }
        self.pool.validate()
    }
}

/// Pool sizing and connection lifetimes handed to `PgPoolOptions`
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        // Attendance traffic is bursty around shift changes but low overall
        Self {
            min_connections: 1,
            max_connections: 8,
            acquire_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(invalid("pool.max_connections", "must be at least 1"));
        }
        if self.min_connections > self.max_connections {
            return Err(invalid(
                "pool.min_connections",
                format!("{} exceeds max_connections {}", self.min_connections, self.max_connections),
            ));
        }
        if self.acquire_timeout.is_zero() {
            return Err(invalid("pool.acquire_timeout", "must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { key: key.to_string(), reason: reason.into() }
}

fn env_number(key: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, format!("'{}' is not a whole number", raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_accepts_both_url_schemes() {
        assert!(PostgresConfig::from_database_url("postgres://localhost/shiftgate").is_ok());
        let config = PostgresConfig::from_database_url(" postgresql://localhost/shiftgate ").unwrap();
        assert_eq!(config.database_url, "postgresql://localhost/shiftgate");
        assert_eq!(config.pool.max_connections, 8);
    }

    #[test]
    fn test_rejects_blank_and_foreign_urls() {
        for url in ["", "   ", "mysql://localhost/shiftgate"] {
            match PostgresConfig::from_database_url(url) {
                Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "database_url"),
                other => panic!("expected invalid database_url for {url:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_pool_bounds() {
        let inverted = PoolConfig { min_connections: 9, max_connections: 4, ..Default::default() };
        assert!(inverted.validate().is_err());

        let empty = PoolConfig { min_connections: 0, max_connections: 0, ..Default::default() };
        assert!(empty.validate().is_err());

        let no_wait = PoolConfig { acquire_timeout: Duration::ZERO, ..Default::default() };
        assert!(no_wait.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var("DATABASE_URL", "postgres://db/shiftgate");
        std::env::set_var("SHIFTGATE_DB_MAX_CONNECTIONS", "20");
        std::env::set_var("SHIFTGATE_DB_ACQUIRE_TIMEOUT_SECS", "7");

        let config = PostgresConfig::from_env().unwrap();
        assert_eq!(config.pool.max_connections, 20);
        assert_eq!(config.pool.acquire_timeout, Duration::from_secs(7));

        std::env::set_var("SHIFTGATE_DB_MAX_CONNECTIONS", "lots");
        assert!(matches!(PostgresConfig::from_env(), Err(ConfigError::Invalid { .. })));

        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("SHIFTGATE_DB_MAX_CONNECTIONS");
        std::env::remove_var("SHIFTGATE_DB_ACQUIRE_TIMEOUT_SECS");
        assert_eq!(
            PostgresConfig::from_env().unwrap_err(),
            ConfigError::Missing("DATABASE_URL".to_string())
        );
    }
}
