use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shiftgate_core::error::{Result, ShiftgateError};
use shiftgate_core::models::{Role, SyncOutcome, Worker, WorkerId, WorkerProfile};
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::{storage_error, PostgresStore};
use crate::ports::WorkerStore;

fn worker_from_row(row: &PgRow) -> std::result::Result<Worker, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let role = Role::parse(&role).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "role".to_string(),
        source: format!("unknown role '{}'", role).into(),
    })?;

    Ok(Worker {
        id: WorkerId(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role,
        synced_at: row.try_get("synced_at")?,
    })
}

#[async_trait]
impl WorkerStore for PostgresStore {
    async fn get_worker(&self, id: &WorkerId) -> Result<Option<Worker>> {
        let row = sqlx::query("SELECT id, name, email, role, synced_at FROM workers WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get worker", e))?;

        row.as_ref()
            .map(worker_from_row)
            .transpose()
            .map_err(|e| storage_error("Failed to decode worker", e))
    }

    async fn list_workers(&self) -> Result<Vec<Worker>> {
        let rows =
            sqlx::query("SELECT id, name, email, role, synced_at FROM workers ORDER BY name, id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| storage_error("Failed to list workers", e))?;

        rows.iter()
            .map(worker_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| storage_error("Failed to decode worker", e))
    }

    async fn sync_worker(
        &self,
        profile: &WorkerProfile,
        synced_at: DateTime<Utc>,
    ) -> Result<(Worker, SyncOutcome)> {
        // The update only fires when a field differs, so an identical profile
        // returns no row and keeps its original synced_at.
        let row = sqlx::query(
            r#"
            INSERT INTO workers (id, name, email, role, synced_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name,
                    email = EXCLUDED.email,
                    role = EXCLUDED.role,
                    synced_at = EXCLUDED.synced_at
                WHERE (workers.name, workers.email, workers.role)
                    IS DISTINCT FROM (EXCLUDED.name, EXCLUDED.email, EXCLUDED.role)
            RETURNING id, name, email, role, synced_at, (xmax = 0) AS inserted
            "#,
        )
        .bind(profile.id.as_str())
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(profile.role.as_str())
        .bind(synced_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to sync worker", e))?;

        match row {
            Some(row) => {
                let inserted: bool = row
                    .try_get("inserted")
                    .map_err(|e| storage_error("Failed to decode sync result", e))?;
                let worker =
                    worker_from_row(&row).map_err(|e| storage_error("Failed to decode worker", e))?;
                let outcome = if inserted { SyncOutcome::Created } else { SyncOutcome::Updated };
                Ok((worker, outcome))
            }
            None => {
                let worker = self.get_worker(&profile.id).await?.ok_or_else(|| {
                    ShiftgateError::WorkerNotFound { id: profile.id.to_string() }
                })?;
                Ok((worker, SyncOutcome::Unchanged))
            }
        }
    }
}
