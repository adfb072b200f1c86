//! Insertion-ordered keyed collection.
//!
//! Layers keep their shapes and canvases keep their layers in one of these. Iteration follows
//! first-insertion order; replacing the value of an existing key keeps its slot, removing a key
//! forgets it. This is the order used to break z-index ties and to composite layers.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    slots: BTreeMap<u64, (K, V)>,
    index: HashMap<K, u64>,
    next_slot: u64,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            slots: BTreeMap::new(),
            index: HashMap::new(),
            next_slot: 0,
        }
    }
}

impl<K: Clone + Eq + Hash, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the previous value for `key`, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.index.get(&key)
            && let Some(entry) = self.slots.get_mut(slot)
        {
            return Some(std::mem::replace(&mut entry.1, value));
        }

        let slot = self.next_slot;
        self.next_slot += 1;
        self.index.insert(key.clone(), slot);
        self.slots.insert(slot, (key, value));
        None
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.index.remove(key)?;
        self.slots.remove(&slot).map(|(_, v)| v)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.index.get(key)?;
        self.slots.get(slot).map(|(_, v)| v)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots.values().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.slots.values().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots.values().map(|(_, v)| v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/ordered.rs"]
mod tests;
