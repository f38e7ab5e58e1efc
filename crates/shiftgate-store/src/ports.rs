use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shiftgate_core::error::Result;
use shiftgate_core::models::{
    Shift, ShiftId, ShiftPage, ShiftQuery, Site, SiteId, SyncOutcome, Worker, WorkerId,
    WorkerProfile,
};

/// Port for worker records
#[async_trait]
pub trait WorkerStore: Send + Sync {
    /// Get a worker by ID
    async fn get_worker(&self, id: &WorkerId) -> Result<Option<Worker>>;

    /// List all workers ordered by name
    async fn list_workers(&self) -> Result<Vec<Worker>>;

    /// Insert or update a worker from identity-provider claims.
    ///
    /// The comparison and the write happen atomically; an identical record is
    /// left untouched and reported as `Unchanged`.
    async fn sync_worker(
        &self,
        profile: &WorkerProfile,
        synced_at: DateTime<Utc>,
    ) -> Result<(Worker, SyncOutcome)>;
}

/// Port for the site registry
#[async_trait]
pub trait SiteStore: Send + Sync {
    /// List all sites ordered by name
    async fn list_sites(&self) -> Result<Vec<Site>>;

    /// Get a site by ID
    async fn get_site(&self, id: SiteId) -> Result<Option<Site>>;

    /// Create or replace a site
    async fn upsert_site(&self, site: &Site) -> Result<()>;

    /// Save the single global site.
    ///
    /// Inserts `site` when the registry is empty and replaces the only site in
    /// place (keeping its id) when there is exactly one. Fails with
    /// `SiteSelectionRequired` when several exist. The count and the write
    /// are atomic, so concurrent callers never create two global sites.
    async fn save_global_site(&self, site: &Site) -> Result<Site>;
}

/// Port for shift records
#[async_trait]
pub trait ShiftStore: Send + Sync {
    /// Insert a new ACTIVE shift.
    ///
    /// This is a conditional write: fails with `ShiftAlreadyActive` if the
    /// worker already has an ACTIVE shift, including when a concurrent insert
    /// wins the race.
    async fn insert_active_shift(&self, shift: &Shift) -> Result<()>;

    /// Persist a shift that has just been completed.
    ///
    /// Only applies if the stored row is still ACTIVE; otherwise fails with
    /// `NoActiveShift`.
    async fn complete_shift(&self, shift: &Shift) -> Result<()>;

    /// Get a shift by ID
    async fn get_shift(&self, id: ShiftId) -> Result<Option<Shift>>;

    /// The worker's ACTIVE shift, if any
    async fn active_shift_for(&self, worker_id: &WorkerId) -> Result<Option<Shift>>;

    /// All ACTIVE shifts, oldest clock-in first
    async fn list_active_shifts(&self) -> Result<Vec<Shift>>;

    /// Shifts clocked in at or after `since`, oldest clock-in first
    async fn shifts_clocked_in_since(&self, since: DateTime<Utc>) -> Result<Vec<Shift>>;

    /// The worker's COMPLETED shifts clocked out at or after `since`,
    /// oldest clock-in first
    async fn completed_shifts_since(
        &self,
        worker_id: &WorkerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Shift>>;

    /// Filtered, paged shift history ordered by clock-in time
    async fn query_shifts(&self, query: &ShiftQuery) -> Result<ShiftPage>;
}
