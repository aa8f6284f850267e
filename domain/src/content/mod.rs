//! Stage content records
//!
//! A [`ContentRecord`] is the artifact a stage produced: an immutable JSON
//! document. Scoring never reads it by reflection; instead it is parsed into
//! one of the closed per-stage schemas in [`schemas`] with an explicit
//! "unknown fields ignored, mistyped fields treated as absent" policy.

pub mod schemas;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub use schemas::{
    IdeaContent, MarketAnalysis, PlaybookContent, PrdContent, StageContent, TechnicalContent,
    UxContent,
};

/// Immutable stage artifact
///
/// # Example
///
/// ```
/// use stagegate_domain::ContentRecord;
/// use serde_json::json;
///
/// let record = ContentRecord::new(json!({"problemStatement": "Slow invoicing"}));
/// assert!(record.is_record());
/// assert_eq!(record.text_of("problemStatement"), "Slow invoicing");
///
/// let malformed = ContentRecord::new(json!("just a string"));
/// assert!(!malformed.is_record());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRecord(Value);

impl ContentRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// An empty object record
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Whether the content is a field → value mapping
    pub fn is_record(&self) -> bool {
        self.0.is_object()
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Flattened text of one field (empty when absent)
    pub fn text_of(&self, field: &str) -> String {
        self.get(field).map(flatten_text).unwrap_or_default()
    }

    /// Length of the serialized document in characters
    pub fn serialized_len(&self) -> usize {
        match &self.0 {
            Value::Null => 0,
            other => serde_json::to_string(other)
                .map(|s| s.chars().count())
                .unwrap_or(0),
        }
    }
}

impl From<Value> for ContentRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Flatten any JSON value into plain text by joining its string leaves.
///
/// Numbers are rendered, booleans and nulls are dropped.
pub fn flatten_text(value: &Value) -> String {
    let mut parts = Vec::new();
    collect_text(value, &mut parts);
    parts.join(" ")
}

fn collect_text(value: &Value, parts: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed.to_string());
            }
        }
        Value::Number(n) => parts.push(n.to_string()),
        Value::Array(items) => items.iter().for_each(|v| collect_text(v, parts)),
        Value::Object(map) => map.values().for_each(|v| collect_text(v, parts)),
        Value::Bool(_) | Value::Null => {}
    }
}

/// A list field that accepts strings or objects.
///
/// Objects are flattened to text; empty entries are dropped; a lone string is
/// treated as a one-element list; any other shape is an empty list.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct TextList(Vec<String>);

impl TextList {
    pub fn items(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All items joined with a space
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

impl From<Vec<String>> for TextList {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}

impl<'de> Deserialize<'de> for TextList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let items = match &value {
            Value::Array(items) => items
                .iter()
                .map(flatten_text)
                .filter(|s| !s.is_empty())
                .collect(),
            Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
            _ => Vec::new(),
        };
        Ok(Self(items))
    }
}

/// Deserialize a field, falling back to its default when the shape is wrong.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserialize a text field from any JSON shape.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(flatten_text(&value))
}

/// Deserialize a `{key: text}` map; non-object values become an empty map.
pub(crate) fn lenient_text_map<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), flatten_text(v)))
            .filter(|(_, v)| !v.is_empty())
            .collect(),
        _ => BTreeMap::new(),
    })
}
