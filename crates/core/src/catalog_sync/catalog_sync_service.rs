//! Catalog reconciliation service.
//!
//! ```text
//! CatalogSyncService
//!       │
//!       ├─► ContentSource (fetch the full remote listing)
//!       ├─► plan_sync (classify against ProductRepository reads)
//!       └─► ProductRepository (bulk insert, bulk update)
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use shelfsync_content_source::{ContentSource, Listing};

use super::catalog_sync_model::{BatchFailure, BatchKind, SyncSummary};
use super::catalog_sync_planner::plan_sync;
use crate::errors::{Error, Result};
use crate::products::ProductRepositoryTrait;

/// RAII guard that clears the run-in-progress flag when dropped.
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    /// Returns None if a run already holds the flag.
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Trait for the catalog sync service.
#[async_trait]
pub trait CatalogSyncServiceTrait: Send + Sync {
    /// Fetches the remote listing and reconciles the catalog against it.
    ///
    /// Returns [`Error::SyncInProgress`] without fetching if another run is
    /// executing. A fetch failure aborts the run before any write.
    async fn run_sync(&self) -> Result<SyncSummary>;

    /// Reconciles the catalog against an already fetched listing.
    async fn reconcile(&self, listing: Listing) -> Result<SyncSummary>;

    /// Whether a run is executing right now.
    fn is_running(&self) -> bool;
}

pub struct CatalogSyncService {
    source: Arc<dyn ContentSource>,
    repository: Arc<dyn ProductRepositoryTrait>,
    running: AtomicBool,
}

impl CatalogSyncService {
    pub fn new(source: Arc<dyn ContentSource>, repository: Arc<dyn ProductRepositoryTrait>) -> Self {
        Self {
            source,
            repository,
            running: AtomicBool::new(false),
        }
    }

    /// Plan then apply, stamping every write with `synced_at`.
    pub async fn reconcile_at(
        &self,
        listing: Listing,
        synced_at: DateTime<Utc>,
    ) -> Result<SyncSummary> {
        let plan = plan_sync(self.repository.as_ref(), &listing, synced_at)?;

        let mut summary = SyncSummary {
            skipped: plan.skipped.len(),
            rejected: listing.rejected + plan.rejected,
            ..Default::default()
        };

        if plan.is_noop() {
            debug!("Catalog already matches the remote listing");
            return Ok(summary);
        }

        // Batches are independent: a failed insert does not stop the updates.
        if !plan.inserts.is_empty() {
            let size = plan.inserts.len();
            match self.repository.bulk_insert(plan.inserts).await {
                Ok(outcome) => {
                    for external_id in &outcome.conflicts {
                        warn!(
                            "Product {} already exists; insert dropped as a conflict",
                            external_id
                        );
                    }
                    summary.inserted = outcome.inserted;
                    summary.conflicts = outcome.conflicts.len();
                }
                Err(e) => {
                    error!("Bulk insert of {} products failed: {}", size, e);
                    summary.failures.push(BatchFailure {
                        batch: BatchKind::Insert,
                        size,
                        message: e.to_string(),
                    });
                }
            }
        }

        if !plan.updates.is_empty() {
            let size = plan.updates.len();
            match self.repository.bulk_update(plan.updates).await {
                Ok(updated) => {
                    if updated < size {
                        warn!(
                            "{} of {} planned updates matched no active product",
                            size - updated,
                            size
                        );
                    }
                    summary.updated = updated;
                }
                Err(e) => {
                    error!("Bulk update of {} products failed: {}", size, e);
                    summary.failures.push(BatchFailure {
                        batch: BatchKind::Update,
                        size,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(summary)
    }
}

#[async_trait]
impl CatalogSyncServiceTrait for CatalogSyncService {
    async fn run_sync(&self) -> Result<SyncSummary> {
        let _guard = RunGuard::try_acquire(&self.running).ok_or(Error::SyncInProgress)?;

        info!("Catalog sync started (source: {})", self.source.id());
        let listing = self.source.fetch_listing().await.map_err(|e| {
            error!("Fetching the remote listing failed: {}", e);
            Error::from(e)
        })?;
        debug!(
            "Fetched {} remote products ({} rejected)",
            listing.len(),
            listing.rejected
        );

        let summary = self.reconcile(listing).await?;
        if summary.is_success() {
            info!("{}", summary.summary());
        } else {
            warn!("{}", summary.summary());
        }
        Ok(summary)
    }

    async fn reconcile(&self, listing: Listing) -> Result<SyncSummary> {
        self.reconcile_at(listing, Utc::now()).await
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
