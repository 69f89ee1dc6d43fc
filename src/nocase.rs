// Copyright 2025 Cowboy AI, LLC.

//! Ordered, case-insensitive name→value containers.
//!
//! CIM names (class, property, method, parameter, qualifier) are
//! case-insensitive for lookup and equality but must preserve their
//! original case on round-trip. An [`indexmap::IndexMap`] alone gives us
//! insertion order but keys it on the exact string; wrapping it so the
//! index key is case-folded while the stored entry keeps the original
//! spelling gets us both properties without a hand-rolled linked hash map.

use indexmap::IndexMap;
use std::borrow::Borrow;

fn fold(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// An ordered map from case-insensitive names to values of type `V`.
///
/// Insertion order is preserved; lookup, `contains_key`, and `remove` are
/// case-insensitive; iteration yields the original-case keys.
#[derive(Debug, Clone)]
pub struct NocaseMap<V> {
    entries: IndexMap<String, (String, V)>,
}

impl<V> Default for NocaseMap<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<V> NocaseMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key`, returning the previous value if the
    /// (case-insensitive) key already existed. The new call's casing of
    /// `key` becomes the stored original-case spelling.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let folded = fold(&key);
        self.entries
            .insert(folded, (key, value))
            .map(|(_, old)| old)
    }

    /// Look up a value by name, case-insensitively.
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        String: Borrow<Q>,
        Q: AsRef<str>,
    {
        self.entries.get(&fold(key.as_ref())).map(|(_, v)| v)
    }

    /// Look up a mutable value by name, case-insensitively.
    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: AsRef<str>,
    {
        self.entries.get_mut(&fold(key.as_ref())).map(|(_, v)| v)
    }

    /// True if the (case-insensitive) key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&fold(key))
    }

    /// Remove an entry by name, case-insensitively, preserving the order
    /// of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.shift_remove(&fold(key)).map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(original_case_key, &value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.values().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over `(original_case_key, &mut value)` pairs in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.entries.values_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over the original-case keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(k, _)| k.as_str())
    }

    /// Iterate over the values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().map(|(_, v)| v)
    }
}

impl<V: PartialEq> PartialEq for NocaseMap<V> {
    /// Structural, order-sensitive equality: same keys (case-insensitively),
    /// same values, in the same order. CIM object names compare
    /// case-insensitively; values compare structurally.
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((fa, (_, va)), (fb, (_, vb)))| fa == fb && va == vb)
    }
}

impl<V: Eq> Eq for NocaseMap<V> {}

impl<V> FromIterator<(String, V)> for NocaseMap<V> {
    fn from_iter<T: IntoIterator<Item = (String, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V> IntoIterator for NocaseMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .into_values()
            .collect::<Vec<_>>()
            .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_but_preserves_case() {
        let mut map = NocaseMap::new();
        map.insert("Name", 1);
        assert_eq!(map.get("name"), Some(&1));
        assert_eq!(map.get("NAME"), Some(&1));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Name"]);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut map = NocaseMap::new();
        map.insert("Zebra", 1);
        map.insert("Apple", 2);
        map.insert("Mango", 3);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Zebra", "Apple", "Mango"]);
    }

    #[test]
    fn reinsert_with_different_case_keeps_order_and_new_spelling() {
        let mut map = NocaseMap::new();
        map.insert("Name", 1);
        map.insert("Other", 2);
        map.insert("NAME", 3);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["NAME", "Other"]);
        assert_eq!(map.get("name"), Some(&3));
    }

    #[test]
    fn equality_is_case_insensitive_on_keys() {
        let mut a = NocaseMap::new();
        a.insert("Name", 1);
        let mut b = NocaseMap::new();
        b.insert("NAME", 1);
        assert_eq!(a, b);
    }
}
