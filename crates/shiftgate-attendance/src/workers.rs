use shiftgate_core::error::{Result, ShiftgateError};
use shiftgate_core::models::{SyncOutcome, Worker, WorkerId, WorkerProfile};
use shiftgate_core::ports::Clock;
use shiftgate_store::ports::WorkerStore;
use std::sync::Arc;

/// Worker records mirrored from the external identity provider
pub struct WorkerDirectory {
    store: Arc<dyn WorkerStore>,
    clock: Arc<dyn Clock>,
}

impl WorkerDirectory {
    pub fn new(store: Arc<dyn WorkerStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Bring the stored worker in line with the provider's claims.
    ///
    /// Safe to call on every sign-in: an identical profile is reported as
    /// `Unchanged` and not rewritten.
    pub async fn sync(&self, profile: WorkerProfile) -> Result<(Worker, SyncOutcome)> {
        let profile = WorkerProfile {
            name: profile.name.trim().to_string(),
            email: profile.email.trim().to_string(),
            ..profile
        };

        let (worker, outcome) = self.store.sync_worker(&profile, self.clock.now()).await?;
        match outcome {
            SyncOutcome::Unchanged => tracing::debug!(worker_id = %worker.id, "Worker already in sync"),
            _ => tracing::info!(worker_id = %worker.id, role = worker.role.as_str(), ?outcome, "Worker synced"),
        }
        Ok((worker, outcome))
    }

    pub async fn get(&self, id: &WorkerId) -> Result<Worker> {
        self.store
            .get_worker(id)
            .await?
            .ok_or_else(|| ShiftgateError::WorkerNotFound { id: id.to_string() })
    }

    pub async fn list(&self) -> Result<Vec<Worker>> {
        self.store.list_workers().await
    }
}
