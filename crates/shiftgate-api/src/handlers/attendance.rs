use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use shiftgate_attendance::ReportedLocation;
use shiftgate_core::models::WorkerId;

use crate::dto::{ClockInRequest, ClockOutRequest, ShiftResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/v1/attendance/clock-in
pub async fn clock_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClockInRequest>,
) -> Result<(StatusCode, Json<ShiftResponse>), ApiError> {
    let worker_id = worker_id(&request.worker_id)?;
    let location = ReportedLocation::new(request.latitude, request.longitude)?;

    let shift = state
        .attendance
        .clock_in(&worker_id, request.note, request.site_id, &location)
        .await
        .inspect_err(|e| tracing::warn!(worker_id = %worker_id, error = %e, "Clock-in failed"))?;

    Ok((StatusCode::CREATED, Json(ShiftResponse::from(shift))))
}

/// POST /api/v1/attendance/clock-out
pub async fn clock_out(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClockOutRequest>,
) -> Result<Json<ShiftResponse>, ApiError> {
    let worker_id = worker_id(&request.worker_id)?;
    let location = ReportedLocation::new(request.latitude, request.longitude)?;

    let shift = state
        .attendance
        .clock_out(&worker_id, request.note, &location)
        .await
        .inspect_err(|e| tracing::warn!(worker_id = %worker_id, error = %e, "Clock-out failed"))?;

    Ok(Json(ShiftResponse::from(shift)))
}

fn worker_id(raw: &str) -> Result<WorkerId, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::bad_request("workerId is required"));
    }
    Ok(WorkerId::new(raw))
}
