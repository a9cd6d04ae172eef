use crate::core::attributes::{AttributeRules, ETA_APPROVAL};
use crate::core::blacklist::Blacklist;
use crate::core::category::clean_category;
use crate::core::normalize::normalize_value;
use crate::domain::model::Record;
use serde_json::Value;
use std::collections::HashMap;

pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const BRAND: &str = "brand";
pub const CATEGORY: &str = "category";
pub const GROUP_ID: &str = "group_id";
pub const GROUP_LEADER: &str = "group_leader";
pub const GROUP_COUNT: &str = "group_count";
pub const ETA_FIELD: &str = "eta-zulassung";
pub const MATERIAL: &str = "material";
pub const HEAD_SHAPE: &str = "kopfform";

/// Fields every output row carries, in the order they are appended to headers.
pub const DERIVED_FIELDS: &[&str] = &[GROUP_COUNT, MATERIAL, HEAD_SHAPE];

/// Cleans one batch of catalog rows.
#[derive(Debug, Clone)]
pub struct RowTransformer {
    brands: Blacklist,
    categories: Blacklist,
    rules: AttributeRules,
}

impl RowTransformer {
    pub fn new(brands: Blacklist, categories: Blacklist, rules: AttributeRules) -> Self {
        Self {
            brands,
            categories,
            rules,
        }
    }

    /// Transforms every row; output order matches input order.
    pub fn transform_batch(&self, records: &[Record]) -> Vec<Record> {
        let groups = group_counts(records);
        records
            .iter()
            .map(|record| self.transform_record(record, &groups))
            .collect()
    }

    pub fn transform_record(&self, record: &Record, groups: &HashMap<String, usize>) -> Record {
        let mut out = record.clone();

        if let Some(leader) = record.get(GROUP_LEADER) {
            out.set(GROUP_LEADER, coerce_flag(leader));
        }

        out.set(GROUP_COUNT, variant_label(record.get(GROUP_ID), groups));

        if let Some(category) = record.get(CATEGORY) {
            out.set(CATEGORY, clean_category(category, &self.categories));
        }

        if let Some(brand) = record.get(BRAND) {
            if self.brands.contains_normalized(&normalize_value(brand)) {
                out.set(BRAND, "");
            }
        }

        if record.contains(ETA_FIELD) {
            let in_text = |field: &str| {
                record
                    .get_str(field)
                    .is_some_and(|text| self.rules.mentions_eta(text))
            };
            if in_text(DESCRIPTION) || in_text(TITLE) {
                out.set(ETA_FIELD, ETA_APPROVAL);
            }
        }

        let title = record.get_str(TITLE).unwrap_or("");
        out.set(MATERIAL, self.rules.material(title));
        out.set(HEAD_SHAPE, self.rules.head_shape(title));

        out
    }
}

impl Default for RowTransformer {
    fn default() -> Self {
        Self::new(
            Blacklist::default_brands(),
            Blacklist::default_categories(),
            AttributeRules::default(),
        )
    }
}

/// Non-blank group id of a record, keyed by its text.
fn group_key(value: Option<&Value>) -> Option<String> {
    let key = match value? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if key.trim().is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Number of rows per `group_id`, blank ids ignored.
pub fn group_counts(records: &[Record]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for record in records {
        if let Some(key) = group_key(record.get(GROUP_ID)) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

fn variant_label(group_id: Option<&Value>, groups: &HashMap<String, usize>) -> String {
    let Some(key) = group_key(group_id) else {
        return String::new();
    };
    match groups.get(&key).copied().unwrap_or(1) {
        n if n >= 2 => format!("{} Varianten", n),
        _ => String::new(),
    }
}

fn coerce_flag(value: &Value) -> &'static str {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    if text == "1" || text.eq_ignore_ascii_case("true") {
        "true"
    } else {
        "false"
    }
}
