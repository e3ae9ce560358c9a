//! Reconciliation plan and summary types.

use serde::{Deserialize, Serialize};

use crate::products::{NewProduct, ProductUpdate};

/// Writes staged by the planner, handed to the apply phase as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    pub inserts: Vec<NewProduct>,
    pub updates: Vec<ProductUpdate>,
    /// External ids whose local record is soft-deleted
    pub skipped: Vec<String>,
    /// Records dropped because they failed validation
    pub rejected: usize,
    /// Repeated external ids dropped after their first occurrence
    pub duplicates: usize,
}

impl SyncPlan {
    /// True when the plan issues no writes at all.
    pub fn is_noop(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty()
    }
}

/// Which apply-phase batch a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchKind {
    Insert,
    Update,
}

impl std::fmt::Display for BatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchKind::Insert => write!(f, "insert"),
            BatchKind::Update => write!(f, "update"),
        }
    }
}

/// A bulk write that failed as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub batch: BatchKind,
    /// Number of records the batch carried
    pub size: usize,
    pub message: String,
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    /// Rows actually inserted
    pub inserted: usize,
    /// Rows actually updated
    pub updated: usize,
    /// Remote records whose local counterpart is soft-deleted
    pub skipped: usize,
    /// Inserts dropped because the external id already existed
    pub conflicts: usize,
    /// Remote records dropped by validation, at fetch time or while planning
    pub rejected: usize,
    pub failures: Vec<BatchFailure>,
}

impl SyncSummary {
    /// Check if every batch was applied.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        let counts = format!(
            "{} inserted, {} updated, {} skipped, {} conflicts, {} rejected",
            self.inserted, self.updated, self.skipped, self.conflicts, self.rejected
        );
        if self.is_success() {
            format!("Catalog sync completed: {}", counts)
        } else {
            format!(
                "Catalog sync completed with {} failed batch(es): {}",
                self.failures.len(),
                counts
            )
        }
    }
}
