use std::sync::Arc;

use axum::{extract::State, Json};
use shiftgate_core::models::{Role, WorkerId, WorkerProfile};

use crate::dto::{SyncWorkerRequest, SyncWorkerResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/v1/workers/sync - mirror the signed-in worker's identity claims
pub async fn sync_worker(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SyncWorkerRequest>,
) -> Result<Json<SyncWorkerResponse>, ApiError> {
    if request.id.trim().is_empty() {
        return Err(ApiError::bad_request("id is required"));
    }
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let profile = WorkerProfile {
        id: WorkerId::new(request.id.trim()),
        name: request.name,
        email: request.email,
        role: Role::from_provider_roles(&request.roles),
    };

    let (worker, outcome) = state.workers.sync(profile).await?;
    Ok(Json(SyncWorkerResponse { worker, outcome }))
}
