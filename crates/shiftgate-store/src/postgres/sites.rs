use async_trait::async_trait;
use shiftgate_core::error::{Result, ShiftgateError};
use shiftgate_core::models::{Coordinate, Site, SiteId};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};
use uuid::Uuid;

use super::{storage_error, PostgresStore};
use crate::ports::SiteStore;

/// `pg_advisory_xact_lock` key taken while the global site is written
const GLOBAL_SITE_LOCK: i64 = 0x5347_5349_5445;

fn site_from_row(row: &PgRow) -> std::result::Result<Site, sqlx::Error> {
    Ok(Site {
        id: SiteId(row.try_get("id")?),
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        location: Coordinate::new(row.try_get("latitude")?, row.try_get("longitude")?),
        radius_meters: row.try_get("radius_meters")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl SiteStore for PostgresStore {
    async fn list_sites(&self) -> Result<Vec<Site>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, address, latitude, longitude, radius_meters, updated_at
            FROM sites
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list sites", e))?;

        rows.iter()
            .map(site_from_row)
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| storage_error("Failed to decode site", e))
    }

    async fn get_site(&self, id: SiteId) -> Result<Option<Site>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, address, latitude, longitude, radius_meters, updated_at
            FROM sites
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get site", e))?;

        row.as_ref()
            .map(site_from_row)
            .transpose()
            .map_err(|e| storage_error("Failed to decode site", e))
    }

    async fn upsert_site(&self, site: &Site) -> Result<()> {
        write_site(&self.pool, site)
            .await
            .map_err(|e| storage_error("Failed to save site", e))
    }

    async fn save_global_site(&self, site: &Site) -> Result<Site> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin transaction", e))?;

        // An empty table has no rows to lock, so serialize on an advisory lock
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(GLOBAL_SITE_LOCK)
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to lock site registry", e))?;

        let existing: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM sites")
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to list sites", e))?;
        if existing.len() > 1 {
            return Err(ShiftgateError::SiteSelectionRequired { available: existing.len() });
        }

        let mut saved = site.clone();
        if let Some(id) = existing.first() {
            saved.id = SiteId(*id);
        }
        write_site(&mut *tx, &saved)
            .await
            .map_err(|e| storage_error("Failed to save site", e))?;

        tx.commit().await.map_err(|e| storage_error("Failed to commit transaction", e))?;
        Ok(saved)
    }
}

async fn write_site<'e, E>(executor: E, site: &Site) -> std::result::Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO sites (id, name, address, latitude, longitude, radius_meters, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                address = EXCLUDED.address,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                radius_meters = EXCLUDED.radius_meters,
                updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(site.id.0)
    .bind(&site.name)
    .bind(&site.address)
    .bind(site.location.latitude)
    .bind(site.location.longitude)
    .bind(site.radius_meters)
    .bind(site.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}
