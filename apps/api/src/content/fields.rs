use chrono::NaiveDate;
use serde_json::Value;

use crate::content::document::RawDocument;
use crate::content::models::ImageRef;

/// Sentinel used in end dates for a position that is still held.
pub const PRESENT: &str = "present";

/// Non-empty string value of a key. Numbers and booleans are stringified.
pub fn text(doc: &RawDocument, key: &str) -> Option<String> {
    match doc.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Like [`text`] but empty when absent, for fields the store has no "absent" for.
pub fn text_or_empty(doc: &RawDocument, key: &str) -> String {
    text(doc, key).unwrap_or_default()
}

pub fn flag(doc: &RawDocument, key: &str) -> bool {
    match doc.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Display order; 0 when absent or unparseable.
pub fn order(doc: &RawDocument) -> i64 {
    match doc.get("order") {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Reads a list stored either as a real array, a JSON array literal, or a
/// comma-separated string.
pub fn string_list(doc: &RawDocument, key: &str) -> Vec<String> {
    match doc.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(item_text).collect(),
        Some(Value::String(s)) => parse_json_array(s).unwrap_or_else(|| split_on_comma(s)),
        _ => Vec::new(),
    }
}

pub fn parse_json_array(raw: &str) -> Option<Vec<String>> {
    let items: Vec<Value> = serde_json::from_str(raw.trim()).ok()?;
    Some(items.iter().filter_map(item_text).collect())
}

pub fn split_on_comma(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .unwrap_or(raw);
    raw.split(',')
        .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn item_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads an image given as a bare URL or a `{url, title}` object.
///
/// Title resolution: the object's own title, then the `title_key` metadata
/// value, then `fallback_title`.
pub fn image(
    doc: &RawDocument,
    url_key: &str,
    title_key: &str,
    fallback_title: Option<&str>,
) -> Option<ImageRef> {
    let (url, inline_title) = match doc.get(url_key)? {
        Value::String(s) if !s.trim().is_empty() => (s.trim().to_string(), None),
        Value::Object(map) => {
            let url = map.get("url")?.as_str()?.trim();
            if url.is_empty() {
                return None;
            }
            let title = map
                .get("title")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from);
            (url.to_string(), title)
        }
        _ => return None,
    };

    let title = inline_title
        .or_else(|| text(doc, title_key))
        .or_else(|| fallback_title.filter(|t| !t.is_empty()).map(String::from));

    Some(ImageRef { url, title })
}

/// Parses `YYYY-MM-DD`, `YYYY-MM` (first of the month) or `YYYY` (January 1st).
pub fn date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(&format!("{raw}-01-01"), "%Y-%m-%d").ok();
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .ok()
}

/// End date of a position: `Ok(None)` for absent, empty, or `present`.
/// Any other text that is not a date comes back as the error.
pub fn end_date(doc: &RawDocument, key: &str) -> Result<Option<NaiveDate>, String> {
    let Some(raw) = text(doc, key) else {
        return Ok(None);
    };
    if raw.eq_ignore_ascii_case(PRESENT) {
        return Ok(None);
    }
    date(&raw).map(Some).ok_or(raw)
}
