//! Product repository and service traits.
//!
//! These traits define the contract for catalog operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::products_model::{BulkInsertOutcome, NewProduct, Product, ProductUpdate};
use crate::errors::Result;

/// Trait defining the contract for Product repository operations.
///
/// Uniqueness of `external_id` is enforced by the implementation.
#[async_trait]
pub trait ProductRepositoryTrait: Send + Sync {
    /// Point lookup by remote identifier, regardless of status.
    fn get_by_external_id(&self, external_id: &str) -> Result<Option<Product>>;

    /// Inserts all products in one transaction.
    ///
    /// Rows whose `external_id` already exists are skipped and reported in
    /// [`BulkInsertOutcome::conflicts`] instead of failing the batch.
    async fn bulk_insert(&self, products: Vec<NewProduct>) -> Result<BulkInsertOutcome>;

    /// Applies each merge-set update to its record, only while that record is
    /// still active.
    ///
    /// Returns the number of rows changed.
    async fn bulk_update(&self, updates: Vec<ProductUpdate>) -> Result<usize>;

    /// Soft-deletes the active product with this remote identifier.
    ///
    /// Returns false if there is no active product with that id.
    async fn mark_deleted(&self, external_id: &str, deleted_at: DateTime<Utc>) -> Result<bool>;
}

/// Trait defining the contract for administrative product operations.
#[async_trait]
pub trait ProductServiceTrait: Send + Sync {
    /// Retrieves an active product by its remote identifier.
    fn get_product(&self, external_id: &str) -> Result<Product>;

    /// Soft-deletes a product. The reconciliation engine will leave it alone
    /// from then on.
    async fn delete_product(&self, external_id: &str) -> Result<()>;
}
