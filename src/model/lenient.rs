//! Lenient field decoding
//!
//! The backend is loosely typed: numbers sometimes arrive as strings, text
//! fields as null, timestamps in several shapes. These helpers are used with
//! `#[serde(default, deserialize_with = "...")]` so a bad field degrades to its
//! zero value instead of rejecting the whole record.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::timefmt;

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Text field; null/missing becomes empty, scalars are stringified
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Optional text field; empty strings decode as absent
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = string(deserializer)?;
    Ok(if s.is_empty() { None } else { Some(s) })
}

/// Integer field accepting numbers or numeric strings (fractions truncate)
pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number).map(|f| f.trunc() as i64))
}

/// Non-negative integer field; negatives decode as absent
pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_i64(deserializer)?.and_then(|n| u32::try_from(n).ok()))
}

/// Boolean flag accepting bools, 0/1 and "true"/"yes"/"1"
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1"
        ),
        _ => false,
    })
}

/// Timestamp from a string in any supported format or epoch milliseconds
pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => timefmt::parse_timestamp(&s),
        Some(Value::Number(n)) => n.as_i64().and_then(timefmt::from_millis),
        _ => None,
    })
}

/// Decode a collection, skipping records that are not objects at all.
///
/// A non-array payload (including null) decodes as an empty collection.
pub fn collection<T: DeserializeOwned>(value: Value) -> Vec<T> {
    let Value::Array(items) = value else {
        if !value.is_null() {
            tracing::warn!("Expected a JSON array of records, treating payload as empty");
        }
        return Vec::new();
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::debug!(kept = records.len(), total, "Decoded collection with skipped records");
    }
    records
}
