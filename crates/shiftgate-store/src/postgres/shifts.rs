use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shiftgate_core::error::{Result, ShiftgateError};
use shiftgate_core::models::{
    ClockEvent, Coordinate, Shift, ShiftId, ShiftPage, ShiftQuery, ShiftStatus, SiteId,
    SortOrder, WorkerId,
};
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::{storage_error, PostgresStore, ONE_ACTIVE_PER_WORKER};
use crate::ports::ShiftStore;

const SHIFT_COLUMNS: &str = "id, worker_id, site_id, status, \
     clock_in_at, clock_in_lat, clock_in_lng, clock_in_note, \
     clock_out_at, clock_out_lat, clock_out_lng, clock_out_note";

fn shift_from_row(row: &PgRow) -> std::result::Result<Shift, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status = status.parse::<ShiftStatus>().map_err(|reason| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: reason.into(),
    })?;

    let clock_out_at: Option<DateTime<Utc>> = row.try_get("clock_out_at")?;
    let clock_out_lat: Option<f64> = row.try_get("clock_out_lat")?;
    let clock_out_lng: Option<f64> = row.try_get("clock_out_lng")?;
    let clock_out = match (clock_out_at, clock_out_lat, clock_out_lng) {
        (Some(at), Some(lat), Some(lng)) => Some(ClockEvent {
            at,
            location: Coordinate::new(lat, lng),
            note: row.try_get("clock_out_note")?,
        }),
        _ => None,
    };

    Ok(Shift {
        id: ShiftId(row.try_get("id")?),
        worker_id: WorkerId(row.try_get("worker_id")?),
        site_id: SiteId(row.try_get("site_id")?),
        status,
        clock_in: ClockEvent {
            at: row.try_get("clock_in_at")?,
            location: Coordinate::new(row.try_get("clock_in_lat")?, row.try_get("clock_in_lng")?),
            note: row.try_get("clock_in_note")?,
        },
        clock_out,
    })
}

fn shifts_from_rows(rows: &[PgRow]) -> Result<Vec<Shift>> {
    rows.iter()
        .map(shift_from_row)
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| storage_error("Failed to decode shift", e))
}

/// LIMIT/OFFSET values saturate instead of wrapping negative
fn bind_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Whether the error is the one-ACTIVE-per-worker index rejecting an insert
fn lost_active_race(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(ONE_ACTIVE_PER_WORKER)
        }
        _ => false,
    }
}

#[async_trait]
impl ShiftStore for PostgresStore {
    async fn insert_active_shift(&self, shift: &Shift) -> Result<()> {
        if shift.status != ShiftStatus::Active {
            return Err(ShiftgateError::InvalidShiftTransition {
                shift_id: shift.id.to_string(),
                reason: "only ACTIVE shifts can be inserted".to_string(),
            });
        }

        let result = sqlx::query(
            r#"
            INSERT INTO shifts (id, worker_id, site_id, status,
                                clock_in_at, clock_in_lat, clock_in_lng, clock_in_note)
            VALUES ($1, $2, $3, 'ACTIVE', $4, $5, $6, $7)
            "#,
        )
        .bind(shift.id.0)
        .bind(shift.worker_id.as_str())
        .bind(shift.site_id.0)
        .bind(shift.clock_in.at)
        .bind(shift.clock_in.location.latitude)
        .bind(shift.clock_in.location.longitude)
        .bind(shift.clock_in.note.as_deref())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if lost_active_race(&e) => Err(ShiftgateError::ShiftAlreadyActive {
                worker_id: shift.worker_id.to_string(),
            }),
            Err(e) => Err(storage_error("Failed to insert shift", e)),
        }
    }

    async fn complete_shift(&self, shift: &Shift) -> Result<()> {
        let clock_out = shift.clock_out.as_ref().ok_or_else(|| {
            ShiftgateError::InvalidShiftTransition {
                shift_id: shift.id.to_string(),
                reason: "shift has no clock-out".to_string(),
            }
        })?;

        let result = sqlx::query(
            r#"
            UPDATE shifts
            SET status = 'COMPLETED',
                clock_out_at = $2,
                clock_out_lat = $3,
                clock_out_lng = $4,
                clock_out_note = $5
            WHERE id = $1 AND status = 'ACTIVE'
            "#,
        )
        .bind(shift.id.0)
        .bind(clock_out.at)
        .bind(clock_out.location.latitude)
        .bind(clock_out.location.longitude)
        .bind(clock_out.note.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to complete shift", e))?;

        if result.rows_affected() == 0 {
            return Err(ShiftgateError::NoActiveShift { worker_id: shift.worker_id.to_string() });
        }
        Ok(())
    }

    async fn get_shift(&self, id: ShiftId) -> Result<Option<Shift>> {
        let row = sqlx::query(&format!("SELECT {} FROM shifts WHERE id = $1", SHIFT_COLUMNS))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get shift", e))?;

        row.as_ref()
            .map(shift_from_row)
            .transpose()
            .map_err(|e| storage_error("Failed to decode shift", e))
    }

    async fn active_shift_for(&self, worker_id: &WorkerId) -> Result<Option<Shift>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM shifts WHERE worker_id = $1 AND status = 'ACTIVE'",
            SHIFT_COLUMNS
        ))
        .bind(worker_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get active shift", e))?;

        row.as_ref()
            .map(shift_from_row)
            .transpose()
            .map_err(|e| storage_error("Failed to decode shift", e))
    }

    async fn list_active_shifts(&self) -> Result<Vec<Shift>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM shifts WHERE status = 'ACTIVE' ORDER BY clock_in_at, id",
            SHIFT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list active shifts", e))?;

        shifts_from_rows(&rows)
    }

    async fn shifts_clocked_in_since(&self, since: DateTime<Utc>) -> Result<Vec<Shift>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM shifts WHERE clock_in_at >= $1 ORDER BY clock_in_at, id",
            SHIFT_COLUMNS
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list shifts", e))?;

        shifts_from_rows(&rows)
    }

    async fn completed_shifts_since(
        &self,
        worker_id: &WorkerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Shift>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM shifts
            WHERE worker_id = $1 AND status = 'COMPLETED' AND clock_out_at >= $2
            ORDER BY clock_in_at, id
            "#,
            SHIFT_COLUMNS
        ))
        .bind(worker_id.as_str())
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list completed shifts", e))?;

        shifts_from_rows(&rows)
    }

    async fn query_shifts(&self, query: &ShiftQuery) -> Result<ShiftPage> {
        let direction = match query.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let worker = query.worker_id.as_ref().map(|w| w.as_str());
        let status = query.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM shifts
            WHERE ($1::text IS NULL OR worker_id = $1)
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(worker)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to count shifts", e))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {columns} FROM shifts
            WHERE ($1::text IS NULL OR worker_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY clock_in_at {dir}, id {dir}
            LIMIT $3 OFFSET $4
            "#,
            columns = SHIFT_COLUMNS,
            dir = direction
        ))
        .bind(worker)
        .bind(status)
        .bind(bind_count(query.limit))
        .bind(bind_count(query.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to query shifts", e))?;

        Ok(ShiftPage {
            items: shifts_from_rows(&rows)?,
            total: total.max(0) as usize,
            offset: query.offset,
            limit: query.limit,
        })
    }
}
