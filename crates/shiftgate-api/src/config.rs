use shiftgate_core::config::LayeredConfig;
use shiftgate_core::error::Result;
use std::env;
use std::path::PathBuf;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    pub database_url: Option<String>,
    /// Optional TOML file layered under the SHIFTGATE_* variables
    pub config_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            cors_origin: "http://localhost:3000".to_string(),
            database_url: None,
            config_path: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var("SHIFTGATE_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3001);

        let cors_origin =
            env::var("SHIFTGATE_CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        let config_path = env::var("SHIFTGATE_CONFIG").ok().map(PathBuf::from);

        Self {
            port,
            cors_origin,
            database_url,
            config_path,
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Check if PostgreSQL storage is configured
    pub fn uses_postgres(&self) -> bool {
        self.database_url.is_some()
    }

    /// Attendance settings: defaults, then the config file if any, then environment
    pub fn load_layered(&self) -> Result<LayeredConfig> {
        let mut config = LayeredConfig::with_defaults();
        if let Some(path) = &self.config_path {
            config = config.load_from_file(path)?;
        }
        let config = config.load_from_env();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert!(!config.uses_postgres());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let config = ApiConfig {
            config_path: Some(PathBuf::from("/nonexistent/shiftgate.toml")),
            ..ApiConfig::default()
        };
        assert!(config.load_layered().is_err());
    }
}
