use chrono::{DateTime, Utc};
use serde::Serialize;
use shiftgate_core::models::{Shift, ShiftPage, Site, SiteId, SyncOutcome, Worker};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            service: "shiftgate-api".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResponse {
    pub id: SiteId,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<Site> for SiteResponse {
    fn from(site: Site) -> Self {
        Self {
            id: site.id,
            name: site.name,
            address: site.address,
            latitude: site.location.latitude,
            longitude: site.location.longitude,
            radius: site.radius_meters,
            updated_at: site.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SyncWorkerResponse {
    pub worker: Worker,
    pub outcome: SyncOutcome,
}

/// A shift plus its derived duration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftResponse {
    #[serde(flatten)]
    pub shift: Shift,
    pub duration_minutes: Option<i64>,
}

impl From<Shift> for ShiftResponse {
    fn from(shift: Shift) -> Self {
        Self {
            duration_minutes: shift.duration_minutes(),
            shift,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShiftPageResponse {
    pub items: Vec<ShiftResponse>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

impl From<ShiftPage> for ShiftPageResponse {
    fn from(page: ShiftPage) -> Self {
        Self {
            items: page.items.into_iter().map(ShiftResponse::from).collect(),
            total: page.total,
            offset: page.offset,
            limit: page.limit,
        }
    }
}
