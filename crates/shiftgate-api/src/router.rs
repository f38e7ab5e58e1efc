use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Sites
        .route("/api/v1/site", get(handlers::get_site).put(handlers::put_site))
        .route("/api/v1/sites", get(handlers::list_sites))

        // Workers
        .route("/api/v1/workers/sync", post(handlers::sync_worker))

        // Attendance
        .route("/api/v1/attendance/clock-in", post(handlers::clock_in))
        .route("/api/v1/attendance/clock-out", post(handlers::clock_out))

        // Activity
        .route("/api/v1/roster", get(handlers::get_roster))
        .route("/api/v1/shifts", get(handlers::list_shifts))
        .route("/api/v1/stats", get(handlers::get_stats))

        .with_state(state)
}
