//! Wire format of the content API `entries` endpoint.
//!
//! Pages are decoded leniently: `items` stays raw JSON so that one malformed
//! entry is rejected on its own instead of failing the whole page.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::str::FromStr;

use super::listing::{RemoteFields, RemoteProduct};
use crate::errors::ContentSourceError;

/// One page of the entries collection.
#[derive(Debug, Deserialize)]
pub(crate) struct EntriesPage {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    #[allow(dead_code)]
    pub skip: Option<u64>,
    #[serde(default)]
    #[allow(dead_code)]
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EntryDto {
    #[serde(default)]
    metadata: Option<Value>,
    sys: SysDto,
    #[serde(default)]
    fields: FieldsDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SysDto {
    id: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FieldsDto {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    price: Option<Number>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    stock: Option<i64>,
    #[serde(default)]
    sku: Option<i64>,
}

/// Converts one raw entry into a validated [`RemoteProduct`].
pub(crate) fn parse_entry(raw: Value) -> Result<RemoteProduct, ContentSourceError> {
    let id_hint = raw
        .pointer("/sys/id")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
        .to_string();
    let invalid = |message: String| ContentSourceError::InvalidEntry {
        id: id_hint.clone(),
        message,
    };

    let entry: EntryDto = serde_json::from_value(raw).map_err(|e| invalid(e.to_string()))?;

    let created_at = required_timestamp(entry.sys.created_at.as_deref(), "sys.createdAt")
        .map_err(&invalid)?;
    let updated_at = required_timestamp(entry.sys.updated_at.as_deref(), "sys.updatedAt")
        .map_err(&invalid)?;

    let fields = entry.fields;
    let name = fields
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| invalid("fields.name is required".to_string()))?;

    let price = match fields.price {
        Some(number) => Some(parse_price(&number).map_err(&invalid)?),
        None => None,
    };
    if let Some(stock) = fields.stock {
        if stock < 0 {
            return Err(invalid(format!("fields.stock must be >= 0, got {}", stock)));
        }
    }

    let metadata = match entry.metadata {
        Some(Value::Null) | None => Value::Object(Map::new()),
        Some(value) => value,
    };

    Ok(RemoteProduct {
        id: entry.sys.id,
        created_at,
        updated_at,
        metadata,
        fields: RemoteFields {
            name,
            category: fields.category,
            brand: fields.brand,
            model: fields.model,
            color: fields.color,
            price,
            currency: fields.currency,
            stock: fields.stock,
            sku: fields.sku,
        },
    })
}

fn required_timestamp(raw: Option<&str>, field: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.ok_or_else(|| format!("{} is required", field))?;
    parse_timestamp(raw).ok_or_else(|| format!("{} is not a valid timestamp: {}", field, raw))
}

/// Parses an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// Goes through the textual form so the decimal keeps the digits the API sent.
fn parse_price(number: &Number) -> Result<Decimal, String> {
    let text = number.to_string();
    let price = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| format!("fields.price is not a decimal: {}", e))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(format!("fields.price must be >= 0, got {}", price));
    }
    Ok(price)
}
