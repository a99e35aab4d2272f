use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use geo::MultiPolygon;

/// A scalar value in a [`PropertyBag`] (spec §3: "a property bag (string
/// keys -> scalar/string values)"). Mirrors the stringly-typed dictionaries
/// real portal responses hand back, while keeping the values typed instead
/// of leaving everything as `String` (spec §9 re-architecture note on
/// "dynamic layer discovery via property bags").
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(n) => Some(*n),
            PropertyValue::Float(f) => Some(*f as i64),
            PropertyValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => PropertyValue::Str(s),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PropertyValue::Int(i)
                } else {
                    PropertyValue::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::Bool(b) => PropertyValue::Bool(b),
            _ => PropertyValue::Null,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyBag(pub BTreeMap<String, PropertyValue>);

impl PropertyBag {
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    /// Case-insensitive lookup — portals are inconsistent about field casing
    /// (`GEOID` vs `geoid` vs `GEOID20`).
    pub fn get_ci(&self, key: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.0.insert(key.into(), value);
    }
}

/// Provenance stub attached to every raw feature at extraction time (spec
/// §3). Promoted into the normalized boundary's full provenance record by
/// the normalizer.
#[derive(Debug, Clone)]
pub struct ProvenanceStub {
    pub source_url: String,
    pub fetch_timestamp: DateTime<Utc>,
    pub content_hash: String,
    pub http_status: Option<u16>,
    pub last_modified: Option<String>,
}

/// Source-neutral feature produced by an extractor (spec §3). Destroyed at
/// the normalizer boundary — nothing downstream of normalization should
/// hold a `RawFeature`.
#[derive(Debug, Clone)]
pub struct RawFeature {
    pub geometry: MultiPolygon<f64>,
    pub properties: PropertyBag,
    pub provenance: ProvenanceStub,
}
