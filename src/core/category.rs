use crate::core::blacklist::Blacklist;
use crate::core::list_literal::parse_list_literal;
use crate::core::normalize::normalize;
use serde_json::Value;

/// Separates distinct categories within one cell.
pub const CATEGORY_SEPARATOR: &str = " %% ";
/// Separates the levels of one category path.
pub const PATH_SEPARATOR: &str = " > ";

/// Turns a raw category cell into `a > b %% c` form.
///
/// The cell may hold a single path, a `;`-separated path or a list literal of
/// paths. Anything that cannot be understood is returned trimmed.
pub fn parse_category_cell(cell: &str) -> String {
    let text = cell.trim();
    if text.is_empty() {
        return String::new();
    }

    if let Some(entries) = parse_list_literal(text) {
        return entries
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .map(join_path)
            .collect::<Vec<_>>()
            .join(CATEGORY_SEPARATOR);
    }

    let unquoted = strip_matching_quotes(text);
    if unquoted.contains(';') {
        join_path(unquoted)
    } else {
        unquoted.to_string()
    }
}

/// [`parse_category_cell`] for arbitrary JSON cells; `null` is an empty cell.
pub fn parse_category_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => parse_category_cell(s),
        other => parse_category_cell(&other.to_string()),
    }
}

/// `;` is the level separator inside a path.
fn join_path(entry: &str) -> String {
    if !entry.contains(';') {
        return entry.to_string();
    }
    entry
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

fn strip_matching_quotes(text: &str) -> &str {
    match text.chars().next() {
        Some(q @ ('"' | '\'')) if text.ends_with(q) => text.get(1..text.len() - 1).unwrap_or(""),
        _ => text,
    }
}

fn split_entries(canonical: &str) -> impl Iterator<Item = &str> {
    canonical
        .split("%%")
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

/// Drops a bare category when a deeper path under the same root is present.
///
/// `Schrauben %% Schrauben > Torx` becomes `Schrauben > Torx`.
pub fn remove_flat_duplicates(canonical: &str) -> String {
    let entries: Vec<&str> = split_entries(canonical).collect();
    let roots: Vec<&str> = entries
        .iter()
        .copied()
        .filter(|entry| entry.contains('>'))
        .filter_map(|entry| entry.split('>').next())
        .map(str::trim)
        .collect();

    entries
        .into_iter()
        .filter(|entry| entry.contains('>') || !roots.contains(entry))
        .collect::<Vec<_>>()
        .join(CATEGORY_SEPARATOR)
}

/// Drops every path that has a blacklisted level anywhere in it.
pub fn remove_blacklisted(canonical: &str, blacklist: &Blacklist) -> String {
    split_entries(canonical)
        .filter(|entry| {
            !entry
                .split('>')
                .any(|level| blacklist.contains_normalized(&normalize(level)))
        })
        .collect::<Vec<_>>()
        .join(CATEGORY_SEPARATOR)
}

/// Full category cleanup: parse, prune flat duplicates, filter blacklisted paths.
pub fn clean_category(value: &Value, blacklist: &Blacklist) -> String {
    let parsed = parse_category_value(value);
    let deduplicated = remove_flat_duplicates(&parsed);
    remove_blacklisted(&deduplicated, blacklist)
}
