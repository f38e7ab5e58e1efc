use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use std::collections::HashSet;
use thiserror::Error;

/// Schema for workers, sites and shifts, embedded at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Applying schema migrations failed: {0}")]
    Failed(#[from] MigrateError),

    #[error("Reading the migration ledger failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// One embedded migration and whether the database has it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub applied: bool,
}

pub struct MigrationManager {
    pool: PgPool,
}

impl MigrationManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bring the schema up to date. Already-applied versions are skipped.
    pub async fn run_migrations(&self) -> Result<(), MigrationError> {
        let pending = self.pending_count().await?;
        if pending > 0 {
            tracing::info!(pending, "Applying schema migrations");
        }
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// Every embedded migration, oldest first, flagged with whether it ran
    pub async fn check_status(&self) -> Result<Vec<MigrationStatus>, MigrationError> {
        let applied = self.applied_versions().await?;
        Ok(MIGRATOR
            .iter()
            .map(|m| MigrationStatus {
                version: m.version,
                description: m.description.to_string(),
                applied: applied.contains(&m.version),
            })
            .collect())
    }

    async fn pending_count(&self) -> Result<usize, MigrationError> {
        let applied = self.applied_versions().await?;
        Ok(MIGRATOR.iter().filter(|m| !applied.contains(&m.version)).count())
    }

    async fn applied_versions(&self) -> Result<HashSet<i64>, MigrationError> {
        let exists: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Ok(HashSet::new());
        }

        let versions: Vec<i64> =
            sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
                .fetch_all(&self.pool)
                .await?;
        Ok(versions.into_iter().collect())
    }
}
