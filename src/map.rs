//! Ordered map of decoded mapping entries.
//!
//! [`ValueMap`] wraps an [`IndexMap`] keyed by the text form of each map key. Keys arrive as
//! JSON object keys and are carried through decoding unchanged; the key [`Shape`](crate::Shape)
//! stored next to the map in [`Value::Mapping`](crate::Value::Mapping) says how to read them.
//!
//! ## Examples
//!
//! ```rust
//! use serde_envelope::{Value, ValueMap};
//!
//! let mut map = ValueMap::new();
//! map.insert("name".to_string(), Value::from("Alice"));
//! map.insert("age".to_string(), Value::from(30i32));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of text keys to decoded values.
///
/// # Examples
///
/// ```rust
/// use serde_envelope::{Value, ValueMap};
///
/// let mut map = ValueMap::new();
/// map.insert("first".to_string(), Value::from(1i64));
/// map.insert("second".to_string(), Value::from(2i64));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueMap(IndexMap<String, Value>);

impl ValueMap {
    #[must_use]
    pub fn new() -> Self {
        ValueMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ValueMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Entries ordered by key, the order in which mappings are written.
    pub(crate) fn sorted(&self) -> Vec<(&String, &Value)> {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl From<HashMap<String, Value>> for ValueMap {
    fn from(map: HashMap<String, Value>) -> Self {
        ValueMap(map.into_iter().collect())
    }
}

impl From<ValueMap> for HashMap<String, Value> {
    fn from(map: ValueMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        ValueMap(IndexMap::from_iter(iter))
    }
}
