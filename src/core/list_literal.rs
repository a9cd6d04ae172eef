//! Decoding of list literals found in exported category cells.
//!
//! Shop exports are inconsistent about how a list of categories is written:
//! proper JSON (`["a","b"]`), Python-style single quotes (`['a','b']`), and
//! mixtures of both with backslash escapes all occur. The strategies below are
//! tried from strictest to most forgiving.

use serde_json::Value;
use std::str::Chars;

/// Parses a bracketed list literal into its trimmed entries.
///
/// Returns `None` when `text` is not wrapped in `[` and `]`. Once the brackets
/// are present the tolerant scanner always produces a result, so malformed
/// content never turns into an error.
pub fn parse_list_literal(text: &str) -> Option<Vec<String>> {
    let trimmed = text.trim();
    if !trimmed.starts_with('[') || !trimmed.ends_with(']') {
        return None;
    }

    if let Some(entries) = parse_json_array(trimmed) {
        return Some(entries);
    }

    if !trimmed.contains('"') && trimmed.contains('\'') {
        let requoted = trimmed.replace("\\'", "\\u0027").replace('\'', "\"");
        if let Some(entries) = parse_json_array(&requoted) {
            tracing::trace!("category list decoded after requoting: {}", trimmed);
            return Some(entries);
        }
    }

    tracing::trace!("category list decoded by tolerant scanner: {}", trimmed);
    Some(scan_entries(&trimmed[1..trimmed.len() - 1]))
}

fn parse_json_array(text: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Some(items.iter().map(element_text).collect()),
        _ => None,
    }
}

fn element_text(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    text.trim().to_string()
}

/// Splits the inside of a list literal on commas that are outside quotes.
fn scan_entries(inner: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        match quote {
            Some(open) => {
                if ch == '\\' {
                    match chars.next() {
                        Some(escaped) => decode_escape(escaped, &mut chars, &mut current),
                        None => current.push('\\'),
                    }
                } else if ch == open {
                    quote = None;
                } else {
                    current.push(ch);
                }
            }
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                ',' => parts.push(std::mem::take(&mut current)),
                _ => current.push(ch),
            },
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|part| part.trim().to_string())
        .collect()
}

fn decode_escape(escaped: char, chars: &mut Chars<'_>, out: &mut String) {
    match escaped {
        'n' => out.push('\n'),
        't' => out.push('\t'),
        'r' => out.push('\r'),
        'b' => out.push('\u{0008}'),
        'f' => out.push('\u{000C}'),
        '/' | '\\' | '\'' | '"' => out.push(escaped),
        'u' => decode_unicode_escape(chars, out),
        other => {
            out.push('\\');
            out.push(other);
        }
    }
}

/// Handles the part after `\u`. Invalid sequences are kept verbatim.
fn decode_unicode_escape(chars: &mut Chars<'_>, out: &mut String) {
    let Some(unit) = read_hex4(chars) else {
        out.push_str("\\u");
        return;
    };

    if (0xD800..0xDC00).contains(&unit) {
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            if let Some(low) = read_hex4(&mut lookahead) {
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    out.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                    *chars = lookahead;
                    return;
                }
            }
        }
    }

    out.push(char::from_u32(unit).unwrap_or('\u{FFFD}'));
}

/// Consumes four hex digits, leaving `chars` untouched when they are not there.
fn read_hex4(chars: &mut Chars<'_>) -> Option<u32> {
    let digits = chars.as_str().get(..4)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    for _ in 0..4 {
        chars.next();
    }
    Some(value)
}
