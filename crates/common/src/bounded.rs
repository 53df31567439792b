//! Fixed-capacity map with an explicit eviction rule.
//!
//! Used for the in-memory diagnostic tables (query statistics, error counts,
//! request timings). The map never holds more than `capacity` entries.

use std::collections::HashMap;
use std::hash::Hash;

/// Rule applied when inserting a new key into a full map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eviction {
    /// Drop the single entry that was touched longest ago.
    LeastRecentlyUsed,
    /// Keep only the `retain` most frequently touched entries.
    LeastFrequent { retain: usize },
}

#[derive(Debug, Clone)]
struct Slot<V> {
    value: V,
    last_touched: u64,
    hits: u64,
}

/// A `HashMap` bounded to a fixed number of entries.
#[derive(Debug, Clone)]
pub struct BoundedMap<K, V> {
    entries: HashMap<K, Slot<V>>,
    capacity: usize,
    eviction: Eviction,
    clock: u64,
}

impl<K: Eq + Hash + Clone, V> BoundedMap<K, V> {
    /// Creates an empty map. A capacity of zero is treated as one.
    pub fn new(capacity: usize, eviction: Eviction) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            eviction,
            clock: 0,
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value for `key` without touching it.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|slot| &slot.value)
    }

    /// Number of times `key` has been touched since it was inserted.
    pub fn hits(&self, key: &K) -> Option<u64> {
        self.entries.get(key).map(|slot| slot.hits)
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `default()` first if absent. Counts as a touch of the entry.
    ///
    /// Eviction happens before a new key is inserted, so the returned entry is
    /// never the one evicted.
    pub fn touch_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
        self.clock += 1;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict();
        }
        let clock = self.clock;
        let slot = self.entries.entry(key).or_insert_with(|| Slot {
            value: default(),
            last_touched: clock,
            hits: 0,
        });
        slot.last_touched = clock;
        slot.hits += 1;
        &mut slot.value
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|slot| slot.value)
    }

    /// Iterates over entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(key, slot)| (key, &slot.value))
    }

    fn evict(&mut self) {
        match self.eviction {
            Eviction::LeastRecentlyUsed => {
                let oldest = self
                    .entries
                    .iter()
                    .min_by_key(|(_, slot)| slot.last_touched)
                    .map(|(key, _)| key.clone());
                if let Some(key) = oldest {
                    self.entries.remove(&key);
                }
            }
            Eviction::LeastFrequent { retain } => {
                // Always make room for at least one new entry.
                let retain = retain.min(self.capacity - 1);
                let mut ranked: Vec<(K, u64, u64)> = self
                    .entries
                    .iter()
                    .map(|(key, slot)| (key.clone(), slot.hits, slot.last_touched))
                    .collect();
                ranked.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));
                for (key, _, _) in ranked.into_iter().skip(retain) {
                    self.entries.remove(&key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lru_evicts_least_recently_touched() {
        let mut map = BoundedMap::new(2, Eviction::LeastRecentlyUsed);
        *map.touch_or_insert_with("a", || 0) += 1;
        *map.touch_or_insert_with("b", || 0) += 1;
        // touching "a" makes "b" the oldest
        *map.touch_or_insert_with("a", || 0) += 1;
        *map.touch_or_insert_with("c", || 0) += 1;

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&"a"), Some(&2));
        assert!(map.get(&"b").is_none());
        assert_eq!(map.get(&"c"), Some(&1));
    }

    #[test]
    fn least_frequent_keeps_top_entries() {
        let mut map = BoundedMap::new(4, Eviction::LeastFrequent { retain: 2 });
        for (key, hits) in [("a", 5), ("b", 1), ("c", 3), ("d", 2)] {
            for _ in 0..hits {
                map.touch_or_insert_with(key, || ());
            }
        }
        map.touch_or_insert_with("e", || ());

        assert_eq!(map.len(), 3);
        assert_eq!(map.hits(&"a"), Some(5));
        assert_eq!(map.hits(&"c"), Some(3));
        assert_eq!(map.hits(&"e"), Some(1));
        assert!(map.get(&"b").is_none());
        assert!(map.get(&"d").is_none());
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut map = BoundedMap::new(10, Eviction::LeastRecentlyUsed);
        for i in 0..100 {
            map.touch_or_insert_with(i, || i);
            assert!(map.len() <= 10);
        }
        assert_eq!(map.len(), 10);
    }

    #[test]
    fn retain_at_capacity_still_makes_room() {
        let mut map = BoundedMap::new(2, Eviction::LeastFrequent { retain: 2 });
        map.touch_or_insert_with(1, || ());
        map.touch_or_insert_with(2, || ());
        map.touch_or_insert_with(3, || ());
        assert_eq!(map.len(), 2);
        assert!(map.get(&3).is_some());
    }
}
