//! In-memory storage implementations for development and testing.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. For production workloads, use the PostgreSQL backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shiftgate_core::error::{Result, ShiftgateError};
use shiftgate_core::models::{
    Shift, ShiftId, ShiftPage, ShiftQuery, ShiftStatus, Site, SiteId, SortOrder, SyncOutcome,
    Worker, WorkerId, WorkerProfile,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ports::{ShiftStore, SiteStore, WorkerStore};

/// In-memory implementation of WorkerStore
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkerStore {
    workers: Arc<RwLock<HashMap<WorkerId, Worker>>>,
}

impl MemoryWorkerStore {
    /// Create a new in-memory worker store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkerStore for MemoryWorkerStore {
    async fn get_worker(&self, id: &WorkerId) -> Result<Option<Worker>> {
        let workers = self.workers.read().unwrap();
        Ok(workers.get(id).cloned())
    }

    async fn list_workers(&self) -> Result<Vec<Worker>> {
        let workers = self.workers.read().unwrap();
        let mut all: Vec<Worker> = workers.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn sync_worker(
        &self,
        profile: &WorkerProfile,
        synced_at: DateTime<Utc>,
    ) -> Result<(Worker, SyncOutcome)> {
        let mut workers = self.workers.write().unwrap();

        let outcome = match workers.get(&profile.id) {
            Some(existing) if profile.matches(existing) => {
                return Ok((existing.clone(), SyncOutcome::Unchanged));
            }
            Some(_) => SyncOutcome::Updated,
            None => SyncOutcome::Created,
        };

        let worker = profile.clone().into_worker(synced_at);
        workers.insert(worker.id.clone(), worker.clone());
        Ok((worker, outcome))
    }
}

/// In-memory implementation of SiteStore
#[derive(Debug, Clone, Default)]
pub struct MemorySiteStore {
    sites: Arc<RwLock<HashMap<SiteId, Site>>>,
}

impl MemorySiteStore {
    /// Create a new in-memory site store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SiteStore for MemorySiteStore {
    async fn list_sites(&self) -> Result<Vec<Site>> {
        let sites = self.sites.read().unwrap();
        let mut all: Vec<Site> = sites.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(all)
    }

    async fn get_site(&self, id: SiteId) -> Result<Option<Site>> {
        let sites = self.sites.read().unwrap();
        Ok(sites.get(&id).cloned())
    }

    async fn upsert_site(&self, site: &Site) -> Result<()> {
        let mut sites = self.sites.write().unwrap();
        sites.insert(site.id, site.clone());
        Ok(())
    }

    async fn save_global_site(&self, site: &Site) -> Result<Site> {
        let mut sites = self.sites.write().unwrap();
        if sites.len() > 1 {
            return Err(ShiftgateError::SiteSelectionRequired { available: sites.len() });
        }

        let mut saved = site.clone();
        if let Some(existing) = sites.keys().next() {
            saved.id = *existing;
        }
        sites.insert(saved.id, saved.clone());
        Ok(saved)
    }
}

/// Shift rows plus the index that plays the role of the
/// "one ACTIVE row per worker" unique constraint
#[derive(Debug, Default)]
struct ShiftTable {
    shifts: HashMap<ShiftId, Shift>,
    active_by_worker: HashMap<WorkerId, ShiftId>,
}

/// In-memory implementation of ShiftStore
#[derive(Debug, Clone, Default)]
pub struct MemoryShiftStore {
    table: Arc<RwLock<ShiftTable>>,
}

impl MemoryShiftStore {
    /// Create a new in-memory shift store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ACTIVE shifts held for a worker; always 0 or 1
    pub fn active_count_for(&self, worker_id: &WorkerId) -> usize {
        let table = self.table.read().unwrap();
        table
            .shifts
            .values()
            .filter(|s| &s.worker_id == worker_id && s.status == ShiftStatus::Active)
            .count()
    }
}

fn sort_by_clock_in(shifts: &mut [Shift], order: SortOrder) {
    shifts.sort_by(|a, b| a.clock_in.at.cmp(&b.clock_in.at).then_with(|| a.id.cmp(&b.id)));
    if order == SortOrder::Desc {
        shifts.reverse();
    }
}

#[async_trait]
impl ShiftStore for MemoryShiftStore {
    async fn insert_active_shift(&self, shift: &Shift) -> Result<()> {
        if shift.status != ShiftStatus::Active {
            return Err(ShiftgateError::InvalidShiftTransition {
                shift_id: shift.id.to_string(),
                reason: "only ACTIVE shifts can be inserted".to_string(),
            });
        }

        let mut table = self.table.write().unwrap();
        if table.active_by_worker.contains_key(&shift.worker_id) {
            return Err(ShiftgateError::ShiftAlreadyActive {
                worker_id: shift.worker_id.to_string(),
            });
        }

        table.active_by_worker.insert(shift.worker_id.clone(), shift.id);
        table.shifts.insert(shift.id, shift.clone());
        Ok(())
    }

    async fn complete_shift(&self, shift: &Shift) -> Result<()> {
        if shift.status != ShiftStatus::Completed || shift.clock_out.is_none() {
            return Err(ShiftgateError::InvalidShiftTransition {
                shift_id: shift.id.to_string(),
                reason: "shift has no clock-out".to_string(),
            });
        }

        let mut table = self.table.write().unwrap();
        let still_active = table.active_by_worker.get(&shift.worker_id) == Some(&shift.id);
        if !still_active {
            return Err(ShiftgateError::NoActiveShift { worker_id: shift.worker_id.to_string() });
        }

        table.active_by_worker.remove(&shift.worker_id);
        table.shifts.insert(shift.id, shift.clone());
        Ok(())
    }

    async fn get_shift(&self, id: ShiftId) -> Result<Option<Shift>> {
        let table = self.table.read().unwrap();
        Ok(table.shifts.get(&id).cloned())
    }

    async fn active_shift_for(&self, worker_id: &WorkerId) -> Result<Option<Shift>> {
        let table = self.table.read().unwrap();
        Ok(table
            .active_by_worker
            .get(worker_id)
            .and_then(|id| table.shifts.get(id))
            .cloned())
    }

    async fn list_active_shifts(&self) -> Result<Vec<Shift>> {
        let table = self.table.read().unwrap();
        let mut active: Vec<Shift> = table
            .active_by_worker
            .values()
            .filter_map(|id| table.shifts.get(id).cloned())
            .collect();
        sort_by_clock_in(&mut active, SortOrder::Asc);
        Ok(active)
    }

    async fn shifts_clocked_in_since(&self, since: DateTime<Utc>) -> Result<Vec<Shift>> {
        let table = self.table.read().unwrap();
        let mut shifts: Vec<Shift> =
            table.shifts.values().filter(|s| s.clock_in.at >= since).cloned().collect();
        sort_by_clock_in(&mut shifts, SortOrder::Asc);
        Ok(shifts)
    }

    async fn completed_shifts_since(
        &self,
        worker_id: &WorkerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Shift>> {
        let table = self.table.read().unwrap();
        let mut shifts: Vec<Shift> = table
            .shifts
            .values()
            .filter(|s| {
                &s.worker_id == worker_id
                    && s.clock_out.as_ref().is_some_and(|out| out.at >= since)
            })
            .cloned()
            .collect();
        sort_by_clock_in(&mut shifts, SortOrder::Asc);
        Ok(shifts)
    }

    async fn query_shifts(&self, query: &ShiftQuery) -> Result<ShiftPage> {
        let table = self.table.read().unwrap();
        let mut matching: Vec<Shift> =
            table.shifts.values().filter(|s| query.matches(s)).cloned().collect();
        sort_by_clock_in(&mut matching, query.order);

        let total = matching.len();
        let items = matching.into_iter().skip(query.offset).take(query.limit).collect();

        Ok(ShiftPage { items, total, offset: query.offset, limit: query.limit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use shiftgate_core::models::{ClockEvent, Coordinate, Role};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
    }

    fn open(worker: &str, minutes_after_t0: i64) -> Shift {
        Shift::open(
            WorkerId::new(worker),
            SiteId::new(),
            ClockEvent::new(
                t0() + Duration::minutes(minutes_after_t0),
                Coordinate::new(37.7749, -122.4194),
                None,
            ),
        )
    }

    fn completed(mut shift: Shift, minutes: i64) -> Shift {
        let at = shift.clock_in.at + Duration::minutes(minutes);
        shift.complete(ClockEvent::new(at, shift.clock_in.location, None)).unwrap();
        shift
    }

    fn site(name: &str) -> Site {
        Site {
            id: SiteId::new(),
            name: name.to_string(),
            address: String::new(),
            location: Coordinate::new(37.7749, -122.4194),
            radius_meters: 2000.0,
            updated_at: t0(),
        }
    }

    #[tokio::test]
    async fn test_global_site_is_created_once_then_replaced() {
        let store = MemorySiteStore::new();
        let first = store.save_global_site(&site("A")).await.unwrap();

        let second = store.save_global_site(&site("B")).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "B");
        assert_eq!(store.list_sites().await.unwrap(), vec![second]);

        store.upsert_site(&site("C")).await.unwrap();
        let err = store.save_global_site(&site("D")).await.unwrap_err();
        assert!(matches!(err, ShiftgateError::SiteSelectionRequired { available: 2 }));
    }

    #[tokio::test]
    async fn test_second_active_insert_is_rejected() {
        let store = MemoryShiftStore::new();
        store.insert_active_shift(&open("w1", 0)).await.unwrap();

        let err = store.insert_active_shift(&open("w1", 5)).await.unwrap_err();
        assert!(matches!(err, ShiftgateError::ShiftAlreadyActive { .. }));

        // A different worker is unaffected
        store.insert_active_shift(&open("w2", 5)).await.unwrap();
        assert_eq!(store.list_active_shifts().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_complete_frees_the_worker() {
        let store = MemoryShiftStore::new();
        let shift = open("w1", 0);
        store.insert_active_shift(&shift).await.unwrap();

        let done = completed(shift.clone(), 60);
        store.complete_shift(&done).await.unwrap();

        assert!(store.active_shift_for(&WorkerId::new("w1")).await.unwrap().is_none());
        assert_eq!(store.get_shift(shift.id).await.unwrap().unwrap().status, ShiftStatus::Completed);

        // Completing twice is rejected
        let err = store.complete_shift(&done).await.unwrap_err();
        assert!(matches!(err, ShiftgateError::NoActiveShift { .. }));

        store.insert_active_shift(&open("w1", 120)).await.unwrap();
    }

    #[tokio::test]
    async fn test_active_list_is_oldest_first() {
        let store = MemoryShiftStore::new();
        store.insert_active_shift(&open("late", 30)).await.unwrap();
        store.insert_active_shift(&open("early", 0)).await.unwrap();
        store.insert_active_shift(&open("middle", 10)).await.unwrap();

        let order: Vec<String> = store
            .list_active_shifts()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.worker_id.0)
            .collect();
        assert_eq!(order, vec!["early", "middle", "late"]);
    }

    #[tokio::test]
    async fn test_query_pages_newest_first() {
        let store = MemoryShiftStore::new();
        for i in 0..5 {
            let shift = open("w1", i * 600);
            store.insert_active_shift(&shift).await.unwrap();
            store.complete_shift(&completed(shift, 480)).await.unwrap();
        }
        store.insert_active_shift(&open("w2", 0)).await.unwrap();

        let query = ShiftQuery::default().for_worker(WorkerId::new("w1")).with_page(1, 2);
        let page = store.query_shifts(&query).await.unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].clock_in.at, t0() + Duration::minutes(3 * 600));
        assert_eq!(page.items[1].clock_in.at, t0() + Duration::minutes(2 * 600));

        let active = store
            .query_shifts(&ShiftQuery::default().with_status(ShiftStatus::Active))
            .await
            .unwrap();
        assert_eq!(active.total, 1);
    }

    #[tokio::test]
    async fn test_completed_shifts_since_filters_on_clock_out() {
        let store = MemoryShiftStore::new();
        let first = open("w1", 0);
        store.insert_active_shift(&first).await.unwrap();
        store.complete_shift(&completed(first, 60)).await.unwrap();

        let second = open("w1", 600);
        store.insert_active_shift(&second).await.unwrap();
        store.complete_shift(&completed(second, 60)).await.unwrap();

        let since = t0() + Duration::minutes(300);
        let shifts = store.completed_shifts_since(&WorkerId::new("w1"), since).await.unwrap();
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].clock_in.at, t0() + Duration::minutes(600));
    }

    #[tokio::test]
    async fn test_sync_worker_reports_outcome() {
        let store = MemoryWorkerStore::new();
        let mut profile = WorkerProfile {
            id: WorkerId::new("auth0|1"),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            role: Role::CareWorker,
        };

        let (_, outcome) = store.sync_worker(&profile, t0()).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Created);

        let (worker, outcome) =
            store.sync_worker(&profile, t0() + Duration::hours(1)).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert_eq!(worker.synced_at, t0());

        profile.role = Role::Manager;
        let (worker, outcome) =
            store.sync_worker(&profile, t0() + Duration::hours(2)).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Updated);
        assert_eq!(worker.role, Role::Manager);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Open(u8),
        Close(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![(0u8..4).prop_map(Op::Open), (0u8..4).prop_map(Op::Close)]
    }

    proptest! {
        #[test]
        fn prop_never_two_active_shifts_per_worker(ops in proptest::collection::vec(op(), 1..60)) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let store = MemoryShiftStore::new();
                for (i, op) in ops.iter().enumerate() {
                    match op {
                        Op::Open(w) => {
                            let _ = store.insert_active_shift(&open(&format!("w{}", w), i as i64)).await;
                        }
                        Op::Close(w) => {
                            let worker = WorkerId::new(format!("w{}", w));
                            if let Some(active) = store.active_shift_for(&worker).await.unwrap() {
                                store.complete_shift(&completed(active, 1)).await.unwrap();
                            }
                        }
                    }
                    for w in 0..4 {
                        assert!(store.active_count_for(&WorkerId::new(format!("w{}", w))) <= 1);
                    }
                }
            });
        }
    }
}
