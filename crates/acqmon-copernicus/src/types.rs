//! Copernicus OpenSearch JSON response types.
//!
//! The hub serializes XML Atom feeds to JSON mechanically: an element that
//! occurs once becomes an object, one that repeats becomes an array, and an
//! absent element is omitted. [`OneOrMany`] absorbs that.

use serde::{Deserialize, Deserializer};

/// Top-level envelope: `{ "feed": { ... } }`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub feed: Feed,
}

#[derive(Debug, Deserialize)]
pub struct Feed {
    /// Total matches for the query across all pages. Sent as a string.
    #[serde(rename = "opensearch:totalResults", deserialize_with = "count_from_str_or_number")]
    pub total_results: u64,
    #[serde(default)]
    pub entry: OneOrMany<Entry>,
}

/// One product in the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    /// Product name, e.g. `S2A_MSIL1C_20220301T001111_N0400_R073_T55HBU_20220301T013417`.
    pub title: String,
    /// Product UUID on the hub.
    #[serde(default)]
    pub id: Option<String>,
    /// String-valued attributes as name/content pairs.
    #[serde(rename = "str", default)]
    pub strings: OneOrMany<NamedValue>,
}

impl Entry {
    /// Content of the string attribute called `name`, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.strings
            .iter()
            .find(|nv| nv.name == name)
            .map(|nv| nv.content.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub content: String,
}

/// A field the hub sends as a single object, an array, or not at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::Many(items) => items.iter(),
            OneOrMany::One(item) => std::slice::from_ref(item).iter(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            OneOrMany::Many(items) => items.len(),
            OneOrMany::One(_) => 1,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

fn count_from_str_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
