use chrono::{DateTime, Utc};
use shiftgate_core::error::{Result, ShiftgateError};
use shiftgate_core::models::{RadiusPolicy, Site, SiteDraft, SiteId};
use shiftgate_core::ports::Clock;
use shiftgate_store::ports::SiteStore;
use std::sync::{Arc, RwLock};
use std::time::Duration;

#[derive(Debug, Clone)]
struct CachedSites {
    sites: Vec<Site>,
    loaded_at: DateTime<Utc>,
}

/// Read-mostly view of the site registry with a short-lived cache.
///
/// Resolves which site a clock-in is checked against: an explicit selection
/// wins, otherwise the single configured site is used.
pub struct SiteResolver {
    store: Arc<dyn SiteStore>,
    policy: RadiusPolicy,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    cache: RwLock<Option<CachedSites>>,
    writes: tokio::sync::Mutex<()>,
}

impl SiteResolver {
    pub fn new(store: Arc<dyn SiteStore>, policy: RadiusPolicy, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            policy,
            ttl,
            clock,
            cache: RwLock::new(None),
            writes: tokio::sync::Mutex::new(()),
        }
    }

    pub fn policy(&self) -> &RadiusPolicy {
        &self.policy
    }

    /// All configured sites, served from cache while it is younger than the TTL
    pub async fn sites(&self) -> Result<Vec<Site>> {
        if let Some(sites) = self.cached() {
            return Ok(sites);
        }

        let sites = self.store.list_sites().await?;
        tracing::debug!(count = sites.len(), "Loaded site registry");
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = Some(CachedSites {
            sites: sites.clone(),
            loaded_at: self.clock.now(),
        });
        Ok(sites)
    }

    /// Pick the site a clock-in is validated against
    pub async fn resolve(&self, selection: Option<SiteId>) -> Result<Site> {
        let sites = self.sites().await?;

        if let Some(id) = selection {
            if let Some(site) = sites.into_iter().find(|s| s.id == id) {
                return Ok(site);
            }
            // The cache may predate the site
            return self
                .store
                .get_site(id)
                .await?
                .ok_or_else(|| ShiftgateError::SiteNotFound { id: id.to_string() });
        }

        match sites.len() {
            0 => Err(ShiftgateError::SiteNotConfigured),
            1 => Ok(sites.into_iter().next().ok_or(ShiftgateError::SiteNotConfigured)?),
            available => Err(ShiftgateError::SiteSelectionRequired { available }),
        }
    }

    /// Create or replace a site.
    ///
    /// Without an explicit id this manages the global site: it is created when
    /// none exists and replaced in place when exactly one does. The store makes
    /// that decision atomically.
    pub async fn configure_site(&self, id: Option<SiteId>, draft: SiteDraft) -> Result<Site> {
        let _write = self.writes.lock().await;

        let site = match id {
            Some(id) => {
                let site = draft.into_site(id, &self.policy, self.clock.now())?;
                self.store.upsert_site(&site).await?;
                site
            }
            None => {
                let candidate = draft.into_site(SiteId::new(), &self.policy, self.clock.now())?;
                self.store.save_global_site(&candidate).await?
            }
        };
        self.invalidate();

        tracing::info!(site_id = %site.id, name = %site.name, radius_meters = site.radius_meters, "Site configured");
        Ok(site)
    }

    pub fn invalidate(&self) {
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn cached(&self) -> Option<Vec<Site>> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        let cached = cache.as_ref()?;
        let age = (self.clock.now() - cached.loaded_at).to_std().ok()?;
        (age < self.ttl).then(|| cached.sites.clone())
    }
}
