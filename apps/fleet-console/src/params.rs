// [[FLEET]]/apps/fleet-console/src/params.rs
// Purpose: Ordered key -> value editor shared by task templates and agent task assignments.
// Architecture: Domain Building Block
// Dependencies: indexmap, Serde

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Values stored in a [`ParameterMap`] decide for themselves what "empty" means.
pub trait ParameterValue {
    /// A blank value is rejected by [`ParameterMap::add`].
    fn is_blank(&self) -> bool;

    /// Normalization applied on insert (usually trimming user input).
    fn normalized(self) -> Self;
}

impl ParameterValue for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }

    fn normalized(self) -> Self {
        self.trim().to_string()
    }
}

/// Insertion-ordered parameter map. Keys are unique; enumeration order is the order of `add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterMap<V> {
    entries: IndexMap<String, V>,
}

impl<V> Default for ParameterMap<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<V> ParameterMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Merge a change into an existing entry. Returns false when the key is unknown.
    pub fn update<F>(&mut self, key: &str, apply: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        match self.entries.get_mut(key) {
            Some(value) => {
                apply(value);
                true
            }
            None => false,
        }
    }

    /// Remove an entry, keeping the order of the rest. Absent keys are not an error.
    pub fn delete(&mut self, key: &str) -> Option<V> {
        self.entries.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V: ParameterValue> ParameterMap<V> {
    /// Add a new entry. No-op (returns false) for a blank key, a blank value or an existing key.
    pub fn add(&mut self, key: &str, value: V) -> bool {
        let key = key.trim();
        if key.is_empty() || value.is_blank() || self.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_string(), value.normalized());
        true
    }
}

impl<V> FromIterator<(String, V)> for ParameterMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<V> IntoIterator for ParameterMap<V> {
    type Item = (String, V);
    type IntoIter = indexmap::map::IntoIter<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
