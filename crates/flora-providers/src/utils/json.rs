//! Defensive readers for loosely specified JSON payloads

use serde_json::Value;

/// Lenient accessors over `serde_json::Value`
pub trait JsonValueExt {
    /// Non-empty trimmed string at `self`, if any
    fn text(&self) -> Option<String>;

    /// Human-readable rendering of a scalar, `{value}` or `{min, max}` object
    fn display_text(&self) -> Option<String>;

    /// Strings of an array, skipping anything else
    fn string_list(&self) -> Vec<String>;
}

impl JsonValueExt for Value {
    fn text(&self) -> Option<String> {
        self.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    }

    fn display_text(&self) -> Option<String> {
        match self {
            Value::String(_) => self.text(),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Object(map) => {
                if let Some(value) = map.get("value") {
                    return value.display_text();
                }
                match (map.get("min").and_then(Value::as_f64), map.get("max").and_then(Value::as_f64)) {
                    (Some(min), Some(max)) if (min - max).abs() < f64::EPSILON => Some(format!("{min}")),
                    (Some(min), Some(max)) => Some(format!("{min}-{max}")),
                    (Some(v), None) | (None, Some(v)) => Some(format!("{v}")),
                    (None, None) => None,
                }
            }
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().filter_map(Value::display_text).collect();
                (!parts.is_empty()).then(|| parts.join(", "))
            }
            Value::Null => None,
        }
    }

    fn string_list(&self) -> Vec<String> {
        self.as_array()
            .map(|items| items.iter().filter_map(Value::text).collect())
            .unwrap_or_default()
    }
}
