//! Attribute bags - the raw key/value records handed over by file parsers.
//!
//! Parsers emit every attribute as text (or as a JSON scalar). Before anything
//! else touches a record, keys are normalized to lower-camel and values are
//! coerced into an [`AttrValue`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A numeric-or-string attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Text(String),
}

impl AttrValue {
    /// Coerce raw attribute text.
    ///
    /// The text is trimmed; a non-empty remainder that parses as a finite
    /// decimal number becomes [`AttrValue::Number`], anything else stays text.
    /// Parsing never consults the locale.
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return AttrValue::Text(String::new());
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => AttrValue::Number(number),
            _ => AttrValue::Text(trimmed.to_string()),
        }
    }

    /// Get the numeric value, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Text(_) => None,
        }
    }

    /// Get the value as an integer, truncating any fraction toward zero.
    pub fn as_int(&self) -> Option<i64> {
        self.as_number().map(|n| n.trunc() as i64)
    }

    /// Check if the value is numeric.
    pub fn is_number(&self) -> bool {
        matches!(self, AttrValue::Number(_))
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(raw: &str) -> Self {
        AttrValue::coerce(raw)
    }
}

/// Normalize an attribute name to lower-camel (`StartX` -> `startX`).
pub fn normalize_key(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A scalar as it may appear in a JSON attribute stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl RawScalar {
    fn into_text(self) -> String {
        match self {
            RawScalar::Text(s) => s,
            RawScalar::Number(n) => n.to_string(),
            RawScalar::Flag(b) => b.to_string(),
        }
    }
}

/// One flat attribute record, keyed by normalized attribute name.
///
/// Values are kept as raw text; coercion happens on read so that every
/// consumer sees the same [`AttrValue::coerce`] result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Option<RawScalar>>")]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(name, text)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (key, value) in pairs {
            record.insert(key.as_ref(), value);
        }
        record
    }

    /// Add an attribute.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert an attribute, replacing any previous value under the same normalized name.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(normalize_key(key), value.into());
    }

    /// Trimmed text of an attribute; empty attributes count as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(&normalize_key(key))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Coerced value of a present attribute.
    pub fn value(&self, key: &str) -> Option<AttrValue> {
        self.text(key).map(AttrValue::coerce)
    }

    /// Integer value of an attribute, `None` when absent or non-numeric.
    pub fn int(&self, key: &str) -> Option<i64> {
        self.value(key).and_then(|v| v.as_int())
    }

    /// Iterate over every attribute with its coerced value.
    pub fn coerced(&self) -> impl Iterator<Item = (&str, AttrValue)> {
        self.fields
            .iter()
            .map(|(key, raw)| (key.as_str(), AttrValue::coerce(raw)))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no attributes.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<BTreeMap<String, Option<RawScalar>>> for RawRecord {
    fn from(raw: BTreeMap<String, Option<RawScalar>>) -> Self {
        let mut record = RawRecord::new();
        for (key, value) in raw {
            if let Some(value) = value {
                record.insert(&key, value.into_text());
            }
        }
        record
    }
}
