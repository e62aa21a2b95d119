//! Tolerant field decoding for backend records.
//!
//! List items arrive in whatever shape the backend produced that day:
//! `null` where a value is expected, numbers as strings, cast lists as one
//! comma-separated string. One odd field must not fail a whole page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::movie::parse_cast;

/// Numbers and numeric strings. Non-finite values are rejected.
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// `null` decodes as the type's default.
pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

pub(crate) fn rating<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(as_f64(&Value::deserialize(d)?).unwrap_or_default())
}

/// Whole minutes; fractions are truncated, negatives become zero.
pub(crate) fn minutes<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(as_f64(&Value::deserialize(d)?)
        .filter(|n| *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32)
        .unwrap_or_default())
}

/// An array of names, or a single comma-separated string.
pub(crate) fn cast<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) => parse_cast(&s),
        _ => Vec::new(),
    })
}

/// RFC 3339 timestamps; anything unparsable is treated as absent.
pub(crate) fn timestamp<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        _ => None,
    })
}
