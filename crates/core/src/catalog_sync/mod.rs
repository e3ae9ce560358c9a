//! Catalog sync module - mirrors the remote listing into the local catalog.
//!
//! A run is split into a read-only plan phase (`plan_sync`) and an apply
//! phase that issues at most one bulk insert and one bulk update.

mod catalog_sync_model;
mod catalog_sync_planner;
mod catalog_sync_service;


pub use catalog_sync_model::{BatchFailure, BatchKind, SyncPlan, SyncSummary};
pub use catalog_sync_planner::plan_sync;
pub use catalog_sync_service::{CatalogSyncService, CatalogSyncServiceTrait};
