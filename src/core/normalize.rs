use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

/// Comparison key for blacklist lookups: NFKC, single spaces, trimmed, lower case.
///
/// Only ever compared against other keys, never written to output.
pub fn normalize(text: &str) -> String {
    let composed: String = text.nfkc().collect();
    composed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Like [`normalize`], but non-string cells yield an empty key.
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::String(s) => normalize(s),
        _ => String::new(),
    }
}
