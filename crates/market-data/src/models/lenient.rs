//! Deserializers tolerant of the provider's loose typing.
//!
//! FMP sometimes encodes numbers as strings (`"fiscalYear": "2024"`) and
//! uses empty strings for missing values.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Optional number that may arrive as a JSON number, numeric string or null.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

/// Fiscal year as a number or numeric string. Missing values become 0.
pub fn fiscal_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_to_f64)
        .map(|year| year as i32)
        .unwrap_or(0))
}

/// Optional string where `""` counts as missing.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Reads a retry-after style field which may be a number or numeric string.
pub(crate) fn number_field(object: &serde_json::Map<String, Value>, key: &str) -> f64 {
    object.get(key).and_then(value_to_f64).unwrap_or(0.0)
}
