//! Background scheduler for periodic catalog sync.
//!
//! Runs once at startup, then at every wall-clock multiple of the configured
//! interval (the top of every hour by default).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shelfsync_core::{catalog_sync::CatalogSyncServiceTrait, Error};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

/// First instant strictly after `now` that is a whole multiple of `period`
/// since the Unix epoch.
pub fn next_aligned_tick(now: DateTime<Utc>, period: Duration) -> DateTime<Utc> {
    let secs = period.as_secs().max(1) as i64;
    let next = (now.timestamp().div_euclid(secs) + 1) * secs;
    DateTime::from_timestamp(next, 0).unwrap_or(now + chrono::Duration::seconds(secs))
}

/// Starts the background catalog sync scheduler.
///
/// The loop awaits each run before computing the next tick, so ticks that
/// elapse during a long run are skipped. Shutdown is observed between runs only.
pub fn start_catalog_sync_scheduler(
    service: Arc<dyn CatalogSyncServiceTrait>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Catalog sync scheduler started ({}s interval)",
            interval.as_secs()
        );

        run_scheduled_sync(service.as_ref()).await;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let now = Utc::now();
            let next = next_aligned_tick(now, interval);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!("Next catalog sync at {}", next);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    run_scheduled_sync(service.as_ref()).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Catalog sync scheduler stopped");
    })
}

/// Runs a single scheduled sync. Never propagates a failure.
async fn run_scheduled_sync(service: &dyn CatalogSyncServiceTrait) {
    info!("Running scheduled catalog sync...");

    match service.run_sync().await {
        Ok(summary) if summary.is_success() => {
            info!("Scheduled catalog sync completed: {}", summary.summary());
        }
        Ok(summary) => {
            warn!(
                "Scheduled catalog sync completed with {} failed batch(es): {}",
                summary.failures.len(),
                summary.summary()
            );
        }
        Err(Error::SyncInProgress) => {
            debug!("Scheduled sync skipped: a run is already in progress");
        }
        Err(Error::ContentSource(e)) if e.is_configuration() => {
            error!("Scheduled catalog sync aborted: {}", e);
        }
        Err(Error::ContentSource(e)) if e.is_transient() => {
            warn!("Scheduled catalog sync failed, will retry next tick: {}", e);
        }
        Err(e) => {
            error!("Scheduled catalog sync failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use shelfsync_content_source::{ContentSourceError, Listing};
    use shelfsync_core::catalog_sync::SyncSummary;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSyncService {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSyncService {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CatalogSyncServiceTrait for CountingSyncService {
        async fn run_sync(&self) -> shelfsync_core::Result<SyncSummary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::ContentSource(ContentSourceError::HttpStatus {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                }))
            } else {
                Ok(SyncSummary::default())
            }
        }

        async fn reconcile(&self, _listing: Listing) -> shelfsync_core::Result<SyncSummary> {
            Ok(SyncSummary::default())
        }

        fn is_running(&self) -> bool {
            false
        }
    }

    async fn wait_for_calls(service: &CountingSyncService, wanted: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while service.calls() < wanted {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("scheduler did not run in time");
    }

    #[test]
    fn test_next_tick_is_top_of_next_hour() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 17, 42).unwrap();
        let next = next_aligned_tick(now, Duration::from_secs(3600));
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap());
    }

    #[test]
    fn test_next_tick_on_boundary_moves_forward() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap();
        let next = next_aligned_tick(now, Duration::from_secs(3600));
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_next_tick_for_shorter_interval() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 23, 59, 1).unwrap();
        let next = next_aligned_tick(now, Duration::from_secs(15 * 60));
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_runs_at_startup_and_stops_on_shutdown() {
        let service = CountingSyncService::new(false);
        let (tx, rx) = watch::channel(false);
        let handle =
            start_catalog_sync_scheduler(service.clone(), Duration::from_secs(3600), rx);

        wait_for_calls(&service, 1).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_runs_do_not_stop_the_loop() {
        let service = CountingSyncService::new(true);
        let (tx, rx) = watch::channel(false);
        let handle = start_catalog_sync_scheduler(service.clone(), Duration::from_secs(1), rx);

        wait_for_calls(&service, 2).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }
}
