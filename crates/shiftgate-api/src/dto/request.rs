use serde::Deserialize;
use shiftgate_core::models::SiteId;

/// Clock-in request body; the coordinate is the device's own fix
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockInRequest {
    pub worker_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub note: Option<String>,
    /// Required only when more than one site is configured
    pub site_id: Option<SiteId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockOutRequest {
    pub worker_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub note: Option<String>,
}

/// Site configuration body; without `id` the global site is created or replaced
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRequest {
    pub id: Option<SiteId>,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Admission radius in meters
    pub radius: f64,
}

/// Identity-provider claims for the signed-in worker
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncWorkerRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Shift history query string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftsQuery {
    pub worker_id: Option<String>,
    pub status: Option<String>,
    pub order: Option<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
}
