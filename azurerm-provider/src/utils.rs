//! Utility functions for value normalization

use azurerm_core::resource::Value;

/// Normalize an Azure location (e.g., "West US" -> "westus")
pub fn normalize_location(s: &str) -> String {
    s.replace(' ', "").to_lowercase()
}

/// Schema normalizer wrapping [`normalize_location`]
pub fn normalize_location_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(normalize_location(s)),
        other => other.clone(),
    }
}

/// Normalize a name Azure treats case-insensitively (e.g., workspace names)
pub fn normalize_case_insensitive(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.to_lowercase()),
        other => other.clone(),
    }
}
