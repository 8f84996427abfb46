use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as Json;

/// Submitted form data: every wire key maps to one or more string values,
/// the way an urlencoded body or query string does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WireData {
    values: BTreeMap<String, Vec<String>>,
}

impl WireData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is stored under `key` with a single value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), vec![value.into()]);
    }

    /// Replace whatever is stored under `key` with several values.
    pub fn insert_many<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    /// Builder form of [`WireData::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// First value submitted under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Whether anything was submitted at `prefix` or below it
    /// (`prefix-...`).
    pub fn has_key_under(&self, prefix: &str) -> bool {
        let nested = format!("{}-", prefix);
        self.values
            .keys()
            .any(|key| key == prefix || key.starts_with(&nested))
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Copy every entry of `other` into `self`, overwriting duplicate keys.
    pub fn extend(&mut self, other: WireData) {
        self.values.extend(other.values);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for WireData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut wire = WireData::new();
        for (k, v) in iter {
            wire.insert(k, v);
        }
        wire
    }
}

// ============================================================================
// Loading from JSON / YAML documents
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum WireEntry {
    Many(Vec<Json>),
    One(Json),
}

/// Stringify a document scalar the way a browser would submit it.
fn scalar_to_wire(value: Json) -> Option<String> {
    match value {
        Json::Null => None,
        Json::String(s) => Some(s),
        // an unchecked checkbox submits nothing
        Json::Bool(false) => None,
        Json::Bool(true) => Some("on".to_string()),
        other => Some(other.to_string()),
    }
}

impl<'de> Deserialize<'de> for WireData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, WireEntry> = BTreeMap::deserialize(deserializer)?;
        let mut wire = WireData::new();
        for (key, entry) in raw {
            let values: Vec<String> = match entry {
                WireEntry::Many(items) => items.into_iter().filter_map(scalar_to_wire).collect(),
                WireEntry::One(item) => scalar_to_wire(item).into_iter().collect(),
            };
            if values.is_empty() {
                continue;
            }
            wire.insert_many(key, values);
        }
        Ok(wire)
    }
}

