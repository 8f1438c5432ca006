//! Tolerant field extraction from model replies
//!
//! Model output is untrusted: any field may be missing, null, or of the
//! wrong type. Extractors return [`Field::Absent`] instead of failing, and
//! log a warning when a field was present but malformed.

use serde_json::{Map, Value};
use tracing::{debug, warn};
use xuanji_almanac::Element;

/// A reply field that was either usable or not
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Present(T),
    Absent,
}

impl<T> Field<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.into_option().unwrap_or(default)
    }
}

impl<T: Default> Field<T> {
    pub fn unwrap_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

/// Walk a path of object keys
fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.get(key))
}

fn malformed<T>(path: &[&str], value: &Value, expected: &str) -> Field<T> {
    warn!(
        field = %path.join("."),
        expected,
        got = %value,
        "Ignoring malformed field in model reply"
    );
    Field::Absent
}

fn missing<T>(path: &[&str]) -> Field<T> {
    debug!(field = %path.join("."), "Field absent from model reply");
    Field::Absent
}

/// Non-empty trimmed string
pub fn string_at(root: &Value, path: &[&str]) -> Field<String> {
    match lookup(root, path) {
        None | Some(Value::Null) => missing(path),
        Some(Value::String(s)) if !s.trim().is_empty() => Field::Present(s.trim().to_string()),
        Some(Value::String(_)) => missing(path),
        Some(other) => malformed(path, other, "string"),
    }
}

/// String, or a number rendered as text (lucky numbers arrive either way)
pub fn text_at(root: &Value, path: &[&str]) -> Field<String> {
    match lookup(root, path) {
        Some(Value::Number(n)) => Field::Present(n.to_string()),
        _ => string_at(root, path),
    }
}

/// List of non-empty strings
///
/// Non-string items are skipped. A single comma-separated string is split.
pub fn string_list_at(root: &Value, path: &[&str]) -> Field<Vec<String>> {
    match lookup(root, path) {
        None | Some(Value::Null) => missing(path),
        Some(Value::Array(items)) => {
            let list: Vec<String> = items
                .iter()
                .filter_map(|item| item.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if list.len() < items.len() {
                debug!(field = %path.join("."), "Skipped non-string list items");
            }
            Field::Present(list)
        }
        Some(Value::String(s)) => Field::Present(
            s.split([',', '，', '、'])
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
        ),
        Some(other) => malformed(path, other, "array of strings"),
    }
}

/// Score in 0-100, rounded; numeric strings accepted
pub fn score_at(root: &Value, path: &[&str]) -> Field<u32> {
    let raw = match lookup(root, path) {
        None | Some(Value::Null) => return missing(path),
        Some(value) => value,
    };

    let number = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if (0.0..=100.0).contains(&n) => Field::Present(n.round() as u32),
        _ => malformed(path, raw, "number 0-100"),
    }
}

/// Element list; each entry may be a character, an English name, or a phrase
/// containing element characters (e.g. `"水、木"`). Duplicates are dropped.
pub fn elements_at(root: &Value, path: &[&str]) -> Field<Vec<Element>> {
    let entries = match string_list_at(root, path) {
        Field::Present(entries) => entries,
        Field::Absent => return Field::Absent,
    };

    let mut elements = Vec::new();
    for entry in &entries {
        let parsed: Vec<Element> = match Element::from_name(entry) {
            Some(e) => vec![e],
            None => entry
                .chars()
                .filter_map(|c| Element::from_name(&c.to_string()))
                .collect(),
        };
        if parsed.is_empty() {
            debug!(entry = %entry, "Unrecognized favorable element");
        }
        for element in parsed {
            if !elements.contains(&element) {
                elements.push(element);
            }
        }
    }
    Field::Present(elements)
}

/// Nested object
pub fn object_at<'a>(root: &'a Value, path: &[&str]) -> Field<&'a Map<String, Value>> {
    match lookup(root, path) {
        None | Some(Value::Null) => missing(path),
        Some(Value::Object(map)) => Field::Present(map),
        Some(other) => malformed(path, other, "object"),
    }
}

/// Integer, rounding integral-looking floats and numeric strings
pub fn integer_at(root: &Value, path: &[&str]) -> Field<i64> {
    match lookup(root, path) {
        None | Some(Value::Null) => missing(path),
        Some(Value::Number(n)) => match n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)) {
            Some(i) => Field::Present(i),
            None => missing(path),
        },
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(f) => Field::Present(f.round() as i64),
            Err(_) => malformed(path, &Value::String(s.clone()), "integer"),
        },
        Some(other) => malformed(path, other, "integer"),
    }
}
