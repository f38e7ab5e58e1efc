use shiftgate_core::error::Result;
use shiftgate_core::models::{Shift, SiteId, WorkerId};
use std::sync::Arc;

use crate::ledger::ShiftLedger;
use crate::location::Locate;
use crate::sites::SiteResolver;
use crate::workers::WorkerDirectory;

/// Sequences a clock-in or clock-out: locate, resolve the site, then mutate
/// the ledger.
///
/// Location is acquired before the ledger is touched, so a failed or
/// abandoned acquisition never leaves a partial write behind.
#[derive(Clone)]
pub struct AttendanceService {
    workers: Arc<WorkerDirectory>,
    sites: Arc<SiteResolver>,
    ledger: Arc<ShiftLedger>,
}

impl AttendanceService {
    pub fn new(workers: Arc<WorkerDirectory>, sites: Arc<SiteResolver>, ledger: Arc<ShiftLedger>) -> Self {
        Self { workers, sites, ledger }
    }

    pub fn ledger(&self) -> &ShiftLedger {
        &self.ledger
    }

    pub async fn clock_in(
        &self,
        worker_id: &WorkerId,
        note: Option<String>,
        site: Option<SiteId>,
        locator: &dyn Locate,
    ) -> Result<Shift> {
        let worker = self.workers.get(worker_id).await?;
        let coordinate = locator.acquire().await?;
        let site = self.sites.resolve(site).await?;

        tracing::info!(worker_id = %worker.id, site_id = %site.id, "Clock-in requested");
        self.ledger.open_shift(&worker.id, &site, coordinate, note).await
    }

    pub async fn clock_out(
        &self,
        worker_id: &WorkerId,
        note: Option<String>,
        locator: &dyn Locate,
    ) -> Result<Shift> {
        let worker = self.workers.get(worker_id).await?;
        let coordinate = locator.acquire().await?;

        tracing::info!(worker_id = %worker.id, "Clock-out requested");
        self.ledger.close_shift(&worker.id, coordinate, note).await
    }
}
