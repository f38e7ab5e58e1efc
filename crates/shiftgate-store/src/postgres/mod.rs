//! Postgres-backed stores.
//!
//! One `PostgresStore` implements all three store ports over a shared pool.
//! The schema enforces the single-active-shift rule with the partial unique
//! index named by [`ONE_ACTIVE_PER_WORKER`], so concurrent API replicas stay
//! consistent even without the ledger's in-process lock.

pub mod config;
pub mod migrations;
mod shifts;
mod sites;
mod workers;

pub use config::{ConfigError, PoolConfig, PostgresConfig};
pub use migrations::{MigrationError, MigrationManager, MigrationStatus};

use shiftgate_core::error::{Result, ShiftgateError};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub(crate) const ONE_ACTIVE_PER_WORKER: &str = "shifts_one_active_per_worker";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Open the pool and make sure a round trip succeeds before handing it out
    pub async fn new(config: PostgresConfig) -> Result<Self> {
        config.validate().map_err(|e| ShiftgateError::ConfigInvalid {
            key: "database_url".to_string(),
            reason: e.to_string(),
        })?;

        let limits = &config.pool;
        let pool = PgPoolOptions::new()
            .min_connections(limits.min_connections)
            .max_connections(limits.max_connections)
            .acquire_timeout(limits.acquire_timeout)
            .idle_timeout(limits.idle_timeout)
            .max_lifetime(limits.max_lifetime)
            .connect(&config.database_url)
            .await
            .map_err(|e| storage_error("Could not reach the attendance database", e))?;

        let store = Self { pool };
        store.ping().await?;
        tracing::debug!(max_connections = limits.max_connections, "Postgres pool ready");
        Ok(store)
    }

    /// Connect, then apply any schema migrations the database is missing
    pub async fn with_migrations(config: PostgresConfig) -> Result<Self> {
        let store = Self::new(config).await?;
        store.run_migrations().await?;
        Ok(store)
    }

    pub async fn run_migrations(&self) -> Result<()> {
        MigrationManager::new(self.pool.clone())
            .run_migrations()
            .await
            .map_err(|e| ShiftgateError::Storage(e.to_string()))?;

        let status = self.migration_status().await?;
        tracing::info!(applied = status.iter().filter(|m| m.applied).count(), "Database schema is current");
        Ok(())
    }

    pub async fn migration_status(&self) -> Result<Vec<MigrationStatus>> {
        MigrationManager::new(self.pool.clone())
            .check_status()
            .await
            .map_err(|e| ShiftgateError::Storage(e.to_string()))
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Database ping failed", e))?;
        Ok(())
    }
}

pub(crate) fn storage_error(context: &str, e: sqlx::Error) -> ShiftgateError {
    ShiftgateError::Storage(format!("{}: {}", context, e))
}
