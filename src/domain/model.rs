use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One catalog row: field name to cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from string pairs, the shape every CSV row has.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let data = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self { data }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// String value of a field; `None` when absent or not a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.data.contains_key(field)
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.data
            .insert(field.to_string(), Value::String(value.into()));
    }
}

/// Extracted rows together with the column order they arrived in.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    pub rows: usize,
    pub variant_groups: usize,
    pub categories_rewritten: usize,
    pub brands_cleared: usize,
    pub eta_flagged: usize,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub headers: Vec<String>,
    pub processed_records: Vec<Record>,
    pub stats: TransformStats,
}

/// Text form of a cell as it is written back out.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
