use shiftgate_attendance::{
    ActivityAggregator, AttendanceService, ShiftLedger, SiteResolver, WorkerDirectory,
};
use shiftgate_core::config::LayeredConfig;
use shiftgate_core::ports::Clock;
use shiftgate_store::memory::{MemoryShiftStore, MemorySiteStore, MemoryWorkerStore};
use shiftgate_store::ports::{ShiftStore, SiteStore, WorkerStore};
use shiftgate_store::postgres::PostgresStore;
use std::sync::Arc;

/// The storage backends the services are wired to
#[derive(Clone)]
pub struct Stores {
    pub workers: Arc<dyn WorkerStore>,
    pub sites: Arc<dyn SiteStore>,
    pub shifts: Arc<dyn ShiftStore>,
}

impl Stores {
    pub fn memory() -> Self {
        Self {
            workers: Arc::new(MemoryWorkerStore::new()),
            sites: Arc::new(MemorySiteStore::new()),
            shifts: Arc::new(MemoryShiftStore::new()),
        }
    }

    pub fn postgres(store: Arc<PostgresStore>) -> Self {
        Self {
            workers: store.clone(),
            sites: store.clone(),
            shifts: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub attendance: AttendanceService,
    pub workers: Arc<WorkerDirectory>,
    pub sites: Arc<SiteResolver>,
    pub aggregator: Arc<ActivityAggregator>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(stores: Stores, config: &LayeredConfig, clock: Arc<dyn Clock>) -> Self {
        let workers = Arc::new(WorkerDirectory::new(stores.workers.clone(), clock.clone()));
        let sites = Arc::new(SiteResolver::new(
            stores.sites.clone(),
            config.radius_policy(),
            config.site_cache_ttl(),
            clock.clone(),
        ));
        let ledger = Arc::new(ShiftLedger::new(stores.shifts.clone(), stores.sites, clock.clone()));
        let aggregator = Arc::new(ActivityAggregator::new(stores.shifts, stores.workers));

        Self {
            attendance: AttendanceService::new(workers.clone(), sites.clone(), ledger),
            workers,
            sites,
            aggregator,
            clock,
        }
    }
}
