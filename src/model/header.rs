//! Raw header storage for a single part.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A raw header value: one occurrence, or every occurrence in message order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// The earliest occurrence. `None` only for an empty sequence.
    pub fn first(&self) -> Option<&str> {
        match self {
            HeaderValue::Single(v) => Some(v),
            HeaderValue::Multiple(vs) => vs.first().map(String::as_str),
        }
    }

    /// Every occurrence, in order.
    pub fn values(&self) -> &[String] {
        match self {
            HeaderValue::Single(v) => std::slice::from_ref(v),
            HeaderValue::Multiple(vs) => vs,
        }
    }

    /// Record a later occurrence of the same header.
    pub fn push(&mut self, value: String) {
        match self {
            HeaderValue::Single(first) => {
                let first = std::mem::take(first);
                *self = HeaderValue::Multiple(vec![first, value]);
            }
            HeaderValue::Multiple(vs) => vs.push(value),
        }
    }

    /// Apply `f` to every occurrence, keeping the shape.
    pub fn try_map<E>(&self, mut f: impl FnMut(&str) -> Result<String, E>) -> Result<Self, E> {
        Ok(match self {
            HeaderValue::Single(v) => HeaderValue::Single(f(v)?),
            HeaderValue::Multiple(vs) => {
                HeaderValue::Multiple(vs.iter().map(|v| f(v)).collect::<Result<_, E>>()?)
            }
        })
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Single(value)
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        HeaderValue::Multiple(values)
    }
}

impl<const N: usize> From<[&str; N]> for HeaderValue {
    fn from(values: [&str; N]) -> Self {
        HeaderValue::Multiple(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Headers of one part, keyed by lowercase name.
///
/// Keys are lowercased on the way in, so lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, HeaderValue>")]
pub struct HeaderMap {
    #[serde(flatten)]
    entries: BTreeMap<String, HeaderValue>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing any previous occurrences.
    pub fn insert(&mut self, name: &str, value: impl Into<HeaderValue>) {
        self.entries.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Add an occurrence of `name` after any existing ones.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.entry(name.to_ascii_lowercase()) {
            btree_map::Entry::Occupied(mut e) => e.get_mut().push(value),
            btree_map::Entry::Vacant(e) => {
                e.insert(HeaderValue::Single(value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        match self.entries.get(name) {
            Some(v) => Some(v),
            None => self.entries.get(&name.to_ascii_lowercase()),
        }
    }

    /// First occurrence of `name`.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(HeaderValue::first)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<HeaderValue> {
        self.entries.remove(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<BTreeMap<String, HeaderValue>> for HeaderMap {
    fn from(entries: BTreeMap<String, HeaderValue>) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: AsRef<str>, V: Into<HeaderValue>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HeaderMap::new();
        for (k, v) in iter {
            map.insert(k.as_ref(), v);
        }
        map
    }
}
