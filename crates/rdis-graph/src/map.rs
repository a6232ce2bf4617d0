//! Ordered key/value map on top of [`Tree`].

use std::cmp::Ordering;
use std::fmt;

use crate::Tree;

#[derive(Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Ordered map keyed by `K: Ord`.
///
/// Entries compare by key only, which is what lets one tree implementation
/// back both the plain sets and the address-keyed maps.
#[derive(Clone)]
pub struct Map<K, V> {
    tree: Tree<Entry<K, V>>,
}

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Map<K, V> {
    #[must_use]
    pub const fn new() -> Self {
        Self { tree: Tree::new() }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.tree.iter().map(|entry| (&entry.key, &entry.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.tree.iter().map(|entry| &entry.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.tree.iter().map(|entry| &entry.value)
    }

    /// Call `f` on every entry in ascending key order, with the value mutable.
    pub fn map(&mut self, mut f: impl FnMut(&K, &mut V)) {
        self.tree.walk_mut(|entry| f(&entry.key, &mut entry.value));
    }

    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|entry| (&entry.key, &entry.value))
    }

    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|entry| (&entry.key, &entry.value))
    }
}

impl<K: Ord, V> Map<K, V> {
    /// Insert `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.tree
            .replace_by(Entry { key, value }, |a, b| a.key.cmp(&b.key))
            .map(|old| old.value)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.tree
            .remove_by(|entry| key.cmp(&entry.key))
            .map(|entry| entry.value)
    }

    #[must_use]
    pub fn fetch(&self, key: &K) -> Option<&V> {
        self.tree
            .fetch_by(|entry| key.cmp(&entry.key))
            .map(|entry| &entry.value)
    }

    pub fn fetch_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree
            .fetch_mut_by(|entry| key.cmp(&entry.key))
            .map(|entry| &mut entry.value)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.fetch(key).is_some()
    }

    /// Entry with the greatest key less than or equal to `key`.
    #[must_use]
    pub fn fetch_max(&self, key: &K) -> Option<(&K, &V)> {
        self.tree
            .fetch_max_by(|entry| key.cmp(&entry.key))
            .map(|entry| (&entry.key, &entry.value))
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for Map<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// Entries are only ever ordered through the closures above; these impls keep
// `Entry` usable wherever `Tree<T: Ord>` is required.
impl<K: Ord, V> PartialEq for Entry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Ord, V> Eq for Entry<K, V> {}

impl<K: Ord, V> PartialOrd for Entry<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord, V> Ord for Entry<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_value() {
        let mut map = Map::new();
        assert_eq!(map.insert(1u64, "a"), None);
        assert_eq!(map.insert(1u64, "b"), Some("a"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.fetch(&1), Some(&"b"));
    }

    #[test]
    fn test_fetch_max_returns_key() {
        let map: Map<u64, &str> = [(0x1000, "text"), (0x8000, "data")].into_iter().collect();
        assert_eq!(map.fetch_max(&0x1004), Some((&0x1000, &"text")));
        assert_eq!(map.fetch_max(&0x8000), Some((&0x8000, &"data")));
        assert_eq!(map.fetch_max(&0x0fff), None);
    }

    #[test]
    fn test_fetch_mut_and_map() {
        let mut map: Map<u64, u32> = (0..4).map(|k| (k, 0)).collect();
        *map.fetch_mut(&2).unwrap() = 7;
        map.map(|key, value| *value += u32::try_from(*key).unwrap());
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![0, 1, 9, 3]);
    }

    #[test]
    fn test_remove_absent_is_none() {
        let mut map: Map<u64, ()> = Map::new();
        assert_eq!(map.remove(&3), None);
        map.insert(3, ());
        assert_eq!(map.remove(&3), Some(()));
        assert!(map.is_empty());
    }
}
