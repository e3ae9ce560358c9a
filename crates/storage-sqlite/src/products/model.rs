//! Database models for products.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shelfsync_core::errors::ValidationError;
use shelfsync_core::products::{NewProduct, Product, ProductAttributes, ProductStatus, ProductUpdate};
use shelfsync_core::{Error, Result};

/// Database model for products
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductDB {
    pub id: String,
    pub external_id: String,
    pub name: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub stock: Option<i64>,
    pub sku: Option<i64>,
    pub metadata: String,
    pub deleted: bool,
    pub deleted_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub last_synced_at: String,
}

/// Database model for inserting a product
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProductDB {
    pub id: String,
    pub external_id: String,
    pub name: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub stock: Option<i64>,
    pub sku: Option<i64>,
    pub metadata: String,
    pub deleted: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_synced_at: String,
}

/// Merge-set changeset: `None` columns are left out of the UPDATE.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::products)]
pub struct ProductChangesetDB {
    pub name: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub stock: Option<i64>,
    pub sku: Option<i64>,
    pub metadata: String,
    pub updated_at: String,
    pub last_synced_at: String,
}

/// Fixed-width UTC text so stored timestamps sort chronologically.
pub fn timestamp_to_text(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn text_to_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            ValidationError::InvalidInput(format!("products.{} '{}': {}", column, raw, e)).into()
        })
}

impl TryFrom<ProductDB> for Product {
    type Error = Error;

    fn try_from(db: ProductDB) -> Result<Self> {
        let price = db.price.as_deref().map(Decimal::from_str).transpose()?;
        let deleted_at = db
            .deleted_at
            .as_deref()
            .map(|raw| text_to_timestamp(raw, "deleted_at"))
            .transpose()?;
        let updated_at = text_to_timestamp(&db.updated_at, "updated_at")?;

        Ok(Self {
            id: db.id,
            external_id: db.external_id,
            name: db.name,
            attributes: ProductAttributes {
                category: db.category,
                brand: db.brand,
                model: db.model,
                color: db.color,
                price,
                currency: db.currency,
                stock: db.stock,
                sku: db.sku,
            },
            metadata: serde_json::from_str(&db.metadata)?,
            created_at: text_to_timestamp(&db.created_at, "created_at")?,
            updated_at,
            last_synced_at: text_to_timestamp(&db.last_synced_at, "last_synced_at")?,
            status: ProductStatus::from_flags(db.deleted, deleted_at, updated_at),
        })
    }
}

impl NewProductDB {
    pub fn from_domain(id: String, domain: NewProduct) -> Self {
        Self {
            id,
            external_id: domain.external_id,
            name: domain.name,
            category: domain.attributes.category,
            brand: domain.attributes.brand,
            model: domain.attributes.model,
            color: domain.attributes.color,
            price: domain.attributes.price.map(|p| p.to_string()),
            currency: domain.attributes.currency,
            stock: domain.attributes.stock,
            sku: domain.attributes.sku,
            metadata: domain.metadata.to_string(),
            deleted: false,
            created_at: timestamp_to_text(&domain.created_at),
            updated_at: timestamp_to_text(&domain.updated_at),
            last_synced_at: timestamp_to_text(&domain.last_synced_at),
        }
    }
}

impl From<&ProductUpdate> for ProductChangesetDB {
    fn from(update: &ProductUpdate) -> Self {
        let attributes = update.attributes.clone();
        Self {
            name: update.name.clone(),
            category: attributes.category,
            brand: attributes.brand,
            model: attributes.model,
            color: attributes.color,
            price: attributes.price.map(|p| p.to_string()),
            currency: attributes.currency,
            stock: attributes.stock,
            sku: attributes.sku,
            metadata: update.metadata.to_string(),
            updated_at: timestamp_to_text(&update.updated_at),
            last_synced_at: timestamp_to_text(&update.last_synced_at),
        }
    }
}
