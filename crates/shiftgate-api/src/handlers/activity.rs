use std::sync::Arc;

use axum::{extract::State, Json};
use shiftgate_attendance::{RosterEntry, WorkerStats};
use shiftgate_core::ports::Clock;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/roster - workers currently clocked in, oldest clock-in first
pub async fn get_roster(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RosterEntry>>, ApiError> {
    let roster = state.aggregator.roster(state.clock.now()).await?;
    Ok(Json(roster))
}

/// GET /api/v1/stats - per-worker figures for today and this week
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<WorkerStats>>, ApiError> {
    let stats = state.aggregator.worker_stats(state.clock.now()).await?;
    Ok(Json(stats))
}
