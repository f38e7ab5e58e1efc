use std::sync::Arc;

use axum::{extract::State, Json};
use shiftgate_core::models::{Coordinate, SiteDraft};

use crate::dto::{SiteRequest, SiteResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/site - the site clock-ins are checked against
pub async fn get_site(State(state): State<Arc<AppState>>) -> Result<Json<SiteResponse>, ApiError> {
    let site = state.sites.resolve(None).await?;
    Ok(Json(site.into()))
}

/// GET /api/v1/sites
pub async fn list_sites(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SiteResponse>>, ApiError> {
    let sites = state.sites.sites().await?;
    Ok(Json(sites.into_iter().map(SiteResponse::from).collect()))
}

/// PUT /api/v1/site - create or replace a site
pub async fn put_site(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SiteRequest>,
) -> Result<Json<SiteResponse>, ApiError> {
    tracing::info!(name = %request.name, radius = request.radius, "Configuring site");

    let draft = SiteDraft {
        name: request.name,
        address: request.address,
        location: Coordinate::new(request.latitude, request.longitude),
        radius_meters: request.radius,
    };
    let site = state.sites.configure_site(request.id, draft).await?;
    Ok(Json(site.into()))
}
