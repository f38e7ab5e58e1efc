use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use shiftgate_core::models::{ShiftQuery, ShiftStatus, SortOrder, WorkerId};

use crate::dto::{ShiftPageResponse, ShiftsQuery};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/shifts - paged shift history, newest clock-in first by default
pub async fn list_shifts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ShiftsQuery>,
) -> Result<Json<ShiftPageResponse>, ApiError> {
    let mut query = ShiftQuery::default().with_page(params.offset, params.limit);

    if let Some(worker_id) = params.worker_id.filter(|w| !w.trim().is_empty()) {
        query = query.for_worker(WorkerId::new(worker_id.trim()));
    }

    if let Some(status) = params.status.as_deref() {
        let status = status
            .parse::<ShiftStatus>()
            .map_err(|e| ApiError::bad_request("Invalid status").with_details(e))?;
        query = query.with_status(status);
    }

    if let Some(order) = params.order.as_deref() {
        let order = match order.to_ascii_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            other => {
                return Err(ApiError::bad_request("Invalid order")
                    .with_details(format!("expected 'asc' or 'desc', got '{}'", other)))
            }
        };
        query = query.with_order(order);
    }

    let page = state.attendance.ledger().history(&query).await?;
    Ok(Json(page.into()))
}
