use shiftgate_core::error::{Result, ShiftgateError};
use shiftgate_core::models::{ClockEvent, Coordinate, Shift, ShiftId, ShiftPage, ShiftQuery, Site, WorkerId};
use shiftgate_core::ports::Clock;
use shiftgate_geo::GeofenceValidator;
use shiftgate_store::ports::{ShiftStore, SiteStore};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

type WorkerLock = Arc<tokio::sync::Mutex<()>>;

/// Owns shift state and the one-ACTIVE-shift-per-worker rule.
///
/// Mutations for a worker run under that worker's lock, so the active-shift
/// check and the write happen as one unit without serializing other workers.
/// The store's conditional writes back this up across processes.
pub struct ShiftLedger {
    shifts: Arc<dyn ShiftStore>,
    sites: Arc<dyn SiteStore>,
    geofence: GeofenceValidator,
    clock: Arc<dyn Clock>,
    worker_locks: Mutex<HashMap<WorkerId, WorkerLock>>,
}

impl ShiftLedger {
    pub fn new(shifts: Arc<dyn ShiftStore>, sites: Arc<dyn SiteStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            shifts,
            sites,
            geofence: GeofenceValidator::new(),
            clock,
            worker_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Open an ACTIVE shift for `worker_id` at `site`
    pub async fn open_shift(
        &self,
        worker_id: &WorkerId,
        site: &Site,
        coordinate: Coordinate,
        note: Option<String>,
    ) -> Result<Shift> {
        coordinate.validate()?;
        self.admit(coordinate, site, worker_id, "clock-in")?;

        self.for_worker(worker_id, || async move {
            if let Some(active) = self.shifts.active_shift_for(worker_id).await? {
                tracing::warn!(worker_id = %worker_id, shift_id = %active.id, "Clock-in rejected: shift already active");
                return Err(ShiftgateError::ShiftAlreadyActive { worker_id: worker_id.to_string() });
            }

            let clock_in = ClockEvent::new(self.clock.now(), coordinate, note);
            let shift = Shift::open(worker_id.clone(), site.id, clock_in);
            self.shifts.insert_active_shift(&shift).await?;

            tracing::info!(worker_id = %worker_id, shift_id = %shift.id, site_id = %site.id, "Shift opened");
            Ok(shift)
        })
        .await
    }

    /// Complete the worker's ACTIVE shift, checking the coordinate against the
    /// site the shift was opened at
    pub async fn close_shift(
        &self,
        worker_id: &WorkerId,
        coordinate: Coordinate,
        note: Option<String>,
    ) -> Result<Shift> {
        coordinate.validate()?;

        self.for_worker(worker_id, || async move {
            let mut shift = self
                .shifts
                .active_shift_for(worker_id)
                .await?
                .ok_or_else(|| ShiftgateError::NoActiveShift { worker_id: worker_id.to_string() })?;

            let site = self
                .sites
                .get_site(shift.site_id)
                .await?
                .ok_or_else(|| ShiftgateError::SiteNotFound { id: shift.site_id.to_string() })?;
            self.admit(coordinate, &site, worker_id, "clock-out")?;

            shift.complete(ClockEvent::new(self.clock.now(), coordinate, note))?;
            self.shifts.complete_shift(&shift).await?;

            tracing::info!(
                worker_id = %worker_id,
                shift_id = %shift.id,
                duration_minutes = shift.duration_minutes(),
                "Shift completed"
            );
            Ok(shift)
        })
        .await
    }

    pub async fn active_shift_for(&self, worker_id: &WorkerId) -> Result<Option<Shift>> {
        self.shifts.active_shift_for(worker_id).await
    }

    /// All ACTIVE shifts, oldest clock-in first
    pub async fn all_active(&self) -> Result<Vec<Shift>> {
        self.shifts.list_active_shifts().await
    }

    pub async fn get_shift(&self, id: ShiftId) -> Result<Option<Shift>> {
        self.shifts.get_shift(id).await
    }

    pub async fn history(&self, query: &ShiftQuery) -> Result<ShiftPage> {
        self.shifts.query_shifts(query).await
    }

    fn admit(&self, coordinate: Coordinate, site: &Site, worker_id: &WorkerId, action: &str) -> Result<()> {
        let check = self.geofence.explain(coordinate, site);
        if !check.admitted {
            tracing::warn!(
                worker_id = %worker_id,
                site_id = %site.id,
                distance_meters = check.distance_meters,
                allowed_radius = check.allowed_radius,
                "{} rejected: outside geofence",
                action
            );
        }
        check.into_result()
    }

    /// Run `op` while holding the worker's lock
    async fn for_worker<T, F, Fut>(&self, worker_id: &WorkerId, op: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        // Declared first so it drops last, after the guard and the Arc, even
        // when the caller abandons this future mid-await
        let _lease = WorkerLease { ledger: self, worker_id };
        let lock = self.worker_lock(worker_id);
        let _guard = lock.lock().await;
        op().await
    }

    fn worker_lock(&self, worker_id: &WorkerId) -> WorkerLock {
        let mut locks = self.worker_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(worker_id.clone()).or_default().clone()
    }

    /// Drop the worker's lock entry once nobody else is waiting on it
    fn release_worker_lock(&self, worker_id: &WorkerId) {
        let mut locks = self.worker_locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks.get(worker_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(worker_id);
        }
    }

    #[cfg(test)]
    fn tracked_workers(&self) -> usize {
        self.worker_locks.lock().unwrap().len()
    }
}

/// Prunes the worker's lock entry when dropped
struct WorkerLease<'a> {
    ledger: &'a ShiftLedger,
    worker_id: &'a WorkerId,
}

impl Drop for WorkerLease<'_> {
    fn drop(&mut self) {
        self.ledger.release_worker_lock(self.worker_id);
    }
}
