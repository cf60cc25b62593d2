//! Value normalization for the search index.
//!
//! Converts raw values selected by a SearchParameter expression into
//! canonical [`IndexKey`]s. Each parameter type has its own rule; the query
//! evaluator matches terms against keys produced here, so the two must agree
//! on case folding and on the `system|code` token layout.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::SearchParamType;

/// Separator between system and code in token keys.
pub const TOKEN_SEPARATOR: char = '|';

/// A finite `f64` usable as an ordered, hashable index key.
///
/// `-0.0` is folded into `0.0`; NaN and infinities are rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NumberKey(f64);

impl NumberKey {
    /// Creates a key, or `None` for non-finite values.
    pub fn new(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Some(Self(if value == 0.0 { 0.0 } else { value }))
    }

    /// Returns the numeric value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialEq for NumberKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for NumberKey {}

impl PartialOrd for NumberKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NumberKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for NumberKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// A normalized index key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndexKey {
    /// String, token (`system|code`), reference, date, and URI keys.
    Text(String),
    /// Number and quantity keys.
    Number(NumberKey),
}

impl IndexKey {
    /// Creates a text key.
    pub fn text(s: impl Into<String>) -> Self {
        IndexKey::Text(s.into())
    }

    /// Creates a numeric key, or `None` for non-finite values.
    pub fn number(value: f64) -> Option<Self> {
        NumberKey::new(value).map(IndexKey::Number)
    }

    /// Returns the text if this is a text key.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            IndexKey::Text(s) => Some(s),
            IndexKey::Number(_) => None,
        }
    }

    /// Returns the number if this is a numeric key.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            IndexKey::Number(n) => Some(n.value()),
            IndexKey::Text(_) => None,
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Text(s) => write!(f, "{}", s),
            IndexKey::Number(n) => write!(f, "{}", n.value()),
        }
    }
}

/// Normalizes one raw value into index keys for the given parameter type.
///
/// Arrays are flattened. Values that do not fit the type (a non-numeric
/// value for a number parameter, an empty string, null) produce no keys.
/// The result holds no duplicates.
pub fn normalize(raw: &Value, param_type: SearchParamType) -> Vec<IndexKey> {
    let mut keys = Vec::new();
    collect(raw, param_type, &mut keys);

    let mut unique = Vec::with_capacity(keys.len());
    for key in keys {
        if !unique.contains(&key) {
            unique.push(key);
        }
    }
    unique
}

fn collect(raw: &Value, param_type: SearchParamType, out: &mut Vec<IndexKey>) {
    if let Value::Array(items) = raw {
        for item in items {
            collect(item, param_type, out);
        }
        return;
    }

    match param_type {
        SearchParamType::Token => normalize_token(raw, out),
        SearchParamType::Reference => normalize_reference(raw, out),
        SearchParamType::Date => normalize_date(raw, out),
        SearchParamType::Number | SearchParamType::Quantity => normalize_number(raw, out),
        SearchParamType::Uri => push_text(out, raw.as_str()),
        SearchParamType::String | SearchParamType::Composite | SearchParamType::Special => {
            normalize_string(raw, out)
        }
    }
}

fn push_text(out: &mut Vec<IndexKey>, value: Option<&str>) {
    if let Some(s) = value.filter(|s| !s.is_empty()) {
        out.push(IndexKey::text(s));
    }
}

fn push_lowercase(out: &mut Vec<IndexKey>, value: Option<&str>) {
    if let Some(s) = value.filter(|s| !s.is_empty()) {
        out.push(IndexKey::text(s.to_lowercase()));
    }
}

/// String form of a scalar (string, number, or boolean).
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn normalize_string(raw: &Value, out: &mut Vec<IndexKey>) {
    match raw {
        Value::Object(obj) => {
            // HumanName and Address parts
            for field in ["family", "text", "city", "district", "state", "postalCode", "country"] {
                push_lowercase(out, obj.get(field).and_then(|v| v.as_str()));
            }
            for field in ["given", "prefix", "suffix", "line"] {
                if let Some(parts) = obj.get(field).and_then(|v| v.as_array()) {
                    for part in parts {
                        push_lowercase(out, part.as_str());
                    }
                }
            }
        }
        other => push_lowercase(out, scalar_text(other).as_deref()),
    }
}

fn normalize_token(raw: &Value, out: &mut Vec<IndexKey>) {
    let Value::Object(obj) = raw else {
        push_lowercase(out, scalar_text(raw).as_deref());
        return;
    };

    // CodeableConcept: one key per coding
    if let Some(codings) = obj.get("coding").and_then(|v| v.as_array()) {
        for coding in codings.iter().filter_map(|c| c.as_object()) {
            push_token_pair(coding, out);
        }
        return;
    }

    push_token_pair(obj, out);
}

/// Pushes `system|code` for a Coding-like or Identifier-like object.
///
/// `value` stands in for `code` (Identifier, ContactPoint). A pair with
/// neither system nor code is skipped.
fn push_token_pair(obj: &Map<String, Value>, out: &mut Vec<IndexKey>) {
    let system = obj.get("system").and_then(|v| v.as_str()).filter(|s| !s.is_empty());
    let code = obj
        .get("code")
        .and_then(|v| v.as_str())
        .or_else(|| obj.get("value").and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty());

    if system.is_none() && code.is_none() {
        return;
    }

    let key = format!(
        "{}{}{}",
        system.unwrap_or_default(),
        TOKEN_SEPARATOR,
        code.unwrap_or_default()
    );
    out.push(IndexKey::text(key.to_lowercase()));
}

fn normalize_reference(raw: &Value, out: &mut Vec<IndexKey>) {
    match raw {
        Value::Object(obj) => push_text(out, obj.get("reference").and_then(|v| v.as_str())),
        other => push_text(out, other.as_str()),
    }
}

fn normalize_date(raw: &Value, out: &mut Vec<IndexKey>) {
    match raw {
        Value::Object(obj) => {
            // Period
            push_text(out, obj.get("start").and_then(|v| v.as_str()));
            push_text(out, obj.get("end").and_then(|v| v.as_str()));
        }
        other => push_text(out, other.as_str()),
    }
}

fn normalize_number(raw: &Value, out: &mut Vec<IndexKey>) {
    let numeric = match raw {
        Value::Object(obj) => obj.get("value").and_then(numeric_value),
        other => numeric_value(other),
    };
    if let Some(key) = numeric.and_then(IndexKey::number) {
        out.push(key);
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
