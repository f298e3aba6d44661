//! Insertion-ordered frequency map.
//!
//! Labels (resolution strings, filenames) map to occurrence counts. The map
//! serializes as a JSON object at the store boundary and preserves insertion
//! order, so top-N tie-breaking follows the order labels were first seen
//! rather than their lexicographic order.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A mapping from string labels to occurrence counts.
///
/// Entries are kept in first-seen order. Counts start at 1 on first
/// occurrence, increment by 1 on each subsequent occurrence, and are never
/// removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyMap {
    entries: Vec<(String, u64)>,
}

impl FrequencyMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no labels.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The count for `label`, if present.
    pub fn get(&self, label: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, count)| *count)
    }

    /// Increment the count for `label`, inserting it at 1 if absent.
    pub fn bump(&mut self, label: &str) {
        match self.entries.iter_mut().find(|(key, _)| key == label) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((label.to_string(), 1)),
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }

    /// The `n` highest-count entries, descending by count.
    ///
    /// Ties keep insertion order (stable sort). Returns fewer than `n`
    /// entries when the map is smaller, and an empty map when empty.
    pub fn top_n(&self, n: usize) -> FrequencyMap {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.truncate(n);
        FrequencyMap { entries: sorted }
    }

    /// Parse a map from its JSON-object representation.
    pub fn from_json(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// Serialize the map to its JSON-object representation.
    pub fn to_json(&self) -> String {
        // Serialization of a string-to-integer map cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Serialize for FrequencyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

struct FrequencyMapVisitor;

impl<'de> Visitor<'de> for FrequencyMapVisitor {
    type Value = FrequencyMap;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object mapping labels to counts")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, count)) = access.next_entry::<String, u64>()? {
            entries.push((key, count));
        }
        Ok(FrequencyMap { entries })
    }
}

impl<'de> Deserialize<'de> for FrequencyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FrequencyMapVisitor)
    }
}

// =============================================================================
// Tests
// =============================================================================
