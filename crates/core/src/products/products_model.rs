//! Product domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shelfsync_content_source::{RemoteFields, RemoteProduct};

use crate::errors::ValidationError;
use crate::Result;

/// Optional product attributes mirrored from the remote field set.
///
/// In a [`ProductUpdate`], `None` means "leave the stored value alone".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttributes {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub stock: Option<i64>,
    pub sku: Option<i64>,
}

impl ProductAttributes {
    /// Overwrites every attribute that is present in `changes`.
    pub fn merge(&mut self, changes: &ProductAttributes) {
        fn set<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if let Some(v) = value {
                *slot = Some(v.clone());
            }
        }
        set(&mut self.category, &changes.category);
        set(&mut self.brand, &changes.brand);
        set(&mut self.model, &changes.model);
        set(&mut self.color, &changes.color);
        set(&mut self.price, &changes.price);
        set(&mut self.currency, &changes.currency);
        set(&mut self.stock, &changes.stock);
        set(&mut self.sku, &changes.sku);
    }

    fn validate(&self) -> Result<()> {
        if let Some(price) = self.price {
            if price.is_sign_negative() && !price.is_zero() {
                return Err(ValidationError::InvalidInput(format!(
                    "price must be non-negative, got {}",
                    price
                ))
                .into());
            }
        }
        if let Some(stock) = self.stock {
            if stock < 0 {
                return Err(ValidationError::InvalidInput(format!(
                    "stock must be non-negative, got {}",
                    stock
                ))
                .into());
            }
        }
        Ok(())
    }
}

impl From<&RemoteFields> for ProductAttributes {
    fn from(fields: &RemoteFields) -> Self {
        Self {
            category: fields.category.clone(),
            brand: fields.brand.clone(),
            model: fields.model.clone(),
            color: fields.color.clone(),
            price: fields.price,
            currency: fields.currency.clone(),
            stock: fields.stock,
            sku: fields.sku,
        }
    }
}

/// Local-only soft-delete state. Never set by the reconciliation engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ProductStatus {
    #[default]
    Active,
    Deleted { deleted_at: DateTime<Utc> },
}

impl ProductStatus {
    /// Builds the status from its persisted `deleted` / `deleted_at` pair.
    ///
    /// A row flagged deleted without a timestamp falls back to `fallback_at`.
    pub fn from_flags(
        deleted: bool,
        deleted_at: Option<DateTime<Utc>>,
        fallback_at: DateTime<Utc>,
    ) -> Self {
        if deleted {
            ProductStatus::Deleted {
                deleted_at: deleted_at.unwrap_or(fallback_at),
            }
        } else {
            ProductStatus::Active
        }
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ProductStatus::Active => None,
            ProductStatus::Deleted { deleted_at } => Some(*deleted_at),
        }
    }
}

/// Domain model representing a catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub external_id: String,
    pub name: String,
    #[serde(flatten)]
    pub attributes: ProductAttributes,
    pub metadata: Value,
    /// Remote creation time
    pub created_at: DateTime<Utc>,
    /// Remote update time
    pub updated_at: DateTime<Utc>,
    /// Last time a sync run wrote this record
    pub last_synced_at: DateTime<Utc>,
    #[serde(flatten)]
    pub status: ProductStatus,
}

impl Product {
    pub fn is_deleted(&self) -> bool {
        matches!(self.status, ProductStatus::Deleted { .. })
    }

    /// Applies an update the way the store does: present attributes replace
    /// stored ones, absent attributes are kept.
    pub fn apply_update(&mut self, update: &ProductUpdate) {
        self.name = update.name.clone();
        self.attributes.merge(&update.attributes);
        self.metadata = update.metadata.clone();
        self.updated_at = update.updated_at;
        self.last_synced_at = update.last_synced_at;
    }
}

/// Input model for inserting a product first seen in the remote listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub external_id: String,
    pub name: String,
    #[serde(flatten)]
    pub attributes: ProductAttributes,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_synced_at: DateTime<Utc>,
}

impl NewProduct {
    /// Builds the insert for a remote record, stamped with the run time.
    pub fn from_remote(remote: &RemoteProduct, synced_at: DateTime<Utc>) -> Self {
        Self {
            external_id: remote.id.clone(),
            name: remote.fields.name.clone(),
            attributes: ProductAttributes::from(&remote.fields),
            metadata: remote.metadata.clone(),
            created_at: remote.created_at,
            updated_at: remote.updated_at,
            last_synced_at: synced_at,
        }
    }

    /// Validates the new product data.
    pub fn validate(&self) -> Result<()> {
        if self.external_id.trim().is_empty() {
            return Err(ValidationError::MissingField("externalId".to_string()).into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        self.attributes.validate()
    }
}

/// Merge-set update for an existing active product, keyed by internal id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub attributes: ProductAttributes,
    pub metadata: Value,
    pub updated_at: DateTime<Utc>,
    pub last_synced_at: DateTime<Utc>,
}

impl ProductUpdate {
    /// Builds the update of `id` from a remote record, stamped with the run time.
    pub fn from_remote(id: &str, remote: &RemoteProduct, synced_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            name: remote.fields.name.clone(),
            attributes: ProductAttributes::from(&remote.fields),
            metadata: remote.metadata.clone(),
            updated_at: remote.updated_at,
            last_synced_at: synced_at,
        }
    }

    /// Validates the update data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id".to_string()).into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        self.attributes.validate()
    }
}

/// What a bulk insert actually wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkInsertOutcome {
    /// Rows written
    pub inserted: usize,
    /// External ids skipped because a record with that id already existed
    pub conflicts: Vec<String>,
}
