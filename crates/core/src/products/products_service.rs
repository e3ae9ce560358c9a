use async_trait::async_trait;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use super::products_model::Product;
use super::products_traits::{ProductRepositoryTrait, ProductServiceTrait};
use crate::errors::{DatabaseError, Result};

/// Service for administrative product operations
pub struct ProductService {
    repository: Arc<dyn ProductRepositoryTrait>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ProductServiceTrait for ProductService {
    /// Deleted products are reported as not found
    fn get_product(&self, external_id: &str) -> Result<Product> {
        match self.repository.get_by_external_id(external_id)? {
            Some(product) if !product.is_deleted() => Ok(product),
            _ => Err(DatabaseError::NotFound(format!("product {}", external_id)).into()),
        }
    }

    async fn delete_product(&self, external_id: &str) -> Result<()> {
        if self.repository.mark_deleted(external_id, Utc::now()).await? {
            info!("Soft-deleted product {}", external_id);
            Ok(())
        } else {
            Err(DatabaseError::NotFound(format!("product {}", external_id)).into())
        }
    }
}
