//! # Eviction Cache
//!
//! Bounded holding area for entries pushed out of a bag.
//!
//! No sampling and no priority order: entries are kept by recency of
//! storage and the least recently stored entry leaves first.

use super::Item;
use std::collections::{BTreeMap, HashMap};

/// A bounded least-recently-stored cache.
#[derive(Debug, Clone)]
pub struct EvictionCache<V: Item> {
    capacity: usize,
    entries: HashMap<V::Key, (V, u64)>,
    order: BTreeMap<u64, V::Key>,
    next_stamp: u64,
}

impl<V: Item> EvictionCache<V> {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A zero capacity cache stores nothing: every `store` hands the entry
    /// straight back.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_stamp: 0,
        }
    }

    /// Store an entry, replacing any entry with the same key.
    ///
    /// Returns the entry that had to leave: the oldest one when full, or
    /// `item` itself when the cache is disabled.
    pub fn store(&mut self, item: V) -> Option<V> {
        if self.capacity == 0 {
            return Some(item);
        }

        let key = item.key().clone();
        if let Some((_, stamp)) = self.entries.remove(&key) {
            self.order.remove(&stamp);
        }

        let stamp = self.next_stamp;
        self.next_stamp = self.next_stamp.saturating_add(1);
        self.order.insert(stamp, key.clone());
        self.entries.insert(key, (item, stamp));

        if self.entries.len() > self.capacity {
            let (_, oldest) = self.order.pop_first()?;
            return self.entries.remove(&oldest).map(|(v, _)| v);
        }
        None
    }

    /// Remove and return the entry stored under `key`.
    pub fn recall(&mut self, key: &V::Key) -> Option<V> {
        let (item, stamp) = self.entries.remove(key)?;
        self.order.remove(&stamp);
        Some(item)
    }

    #[must_use]
    pub fn contains(&self, key: &V::Key) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drain every entry, oldest first.
    pub fn drain(&mut self) -> Vec<V> {
        let order = std::mem::take(&mut self.order);
        order
            .into_values()
            .filter_map(|key| self.entries.remove(&key).map(|(v, _)| v))
            .collect()
    }
}
