//! Plan phase of a reconciliation run.
//!
//! Classifies every remote record against the catalog without writing
//! anything. The whole plan exists before the first write is issued.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::HashSet;

use shelfsync_content_source::Listing;

use super::catalog_sync_model::SyncPlan;
use crate::errors::Result;
use crate::products::{NewProduct, ProductRepositoryTrait, ProductUpdate};

/// Builds the insert/update/skip plan for `listing`.
///
/// - no local record: insert
/// - local record soft-deleted: skip, the deletion is sticky
/// - local record active: merge-set update
///
/// A lookup failure aborts planning, so a run either plans every record or
/// writes nothing.
pub fn plan_sync(
    repository: &dyn ProductRepositoryTrait,
    listing: &Listing,
    synced_at: DateTime<Utc>,
) -> Result<SyncPlan> {
    let mut plan = SyncPlan::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(listing.len());

    for remote in &listing.items {
        if !seen.insert(remote.id.as_str()) {
            warn!(
                "Remote listing repeats external id {}; keeping the first occurrence",
                remote.id
            );
            plan.duplicates += 1;
            continue;
        }

        match repository.get_by_external_id(&remote.id)? {
            None => {
                let new_product = NewProduct::from_remote(remote, synced_at);
                if let Err(e) = new_product.validate() {
                    warn!("Rejecting remote product {}: {}", remote.id, e);
                    plan.rejected += 1;
                    continue;
                }
                plan.inserts.push(new_product);
            }
            Some(existing) if existing.is_deleted() => {
                debug!("Skipping soft-deleted product {}", remote.id);
                plan.skipped.push(remote.id.clone());
            }
            Some(existing) => {
                let update = ProductUpdate::from_remote(&existing.id, remote, synced_at);
                if let Err(e) = update.validate() {
                    warn!("Rejecting remote product {}: {}", remote.id, e);
                    plan.rejected += 1;
                    continue;
                }
                plan.updates.push(update);
            }
        }
    }

    debug!(
        "Sync plan: {} inserts, {} updates, {} skipped, {} rejected, {} duplicates",
        plan.inserts.len(),
        plan.updates.len(),
        plan.skipped.len(),
        plan.rejected,
        plan.duplicates
    );

    Ok(plan)
}
