mod request;
mod response;

pub use request::{ClockInRequest, ClockOutRequest, ShiftsQuery, SiteRequest, SyncWorkerRequest};
pub use response::{HealthResponse, ShiftPageResponse, ShiftResponse, SiteResponse, SyncWorkerResponse};
