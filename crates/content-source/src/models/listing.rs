use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Product attributes as published by the remote source.
///
/// `name` is always present. Every other field is optional; `None` means the
/// remote entry did not carry that field at all.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFields {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Non-negative unit price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Non-negative units in stock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<i64>,
}

impl RemoteFields {
    /// Fields with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One product entry from the remote listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProduct {
    /// The remote source's stable identifier
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Opaque metadata blob, copied as-is
    pub metadata: Value,
    pub fields: RemoteFields,
}

/// The full listing returned by one fetch, in remote order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listing {
    pub items: Vec<RemoteProduct>,
    /// Entries dropped because they failed validation
    pub rejected: usize,
}

impl Listing {
    pub fn new(items: Vec<RemoteProduct>) -> Self {
        Self { items, rejected: 0 }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<RemoteProduct>> for Listing {
    fn from(items: Vec<RemoteProduct>) -> Self {
        Self::new(items)
    }
}
