use std::{collections::BTreeMap, sync::Arc};

use crate::consts::DEFAULT_STATE_CACHE_CAPACITY;

/// Published states keyed by block height, oldest evicted first.
#[derive(Debug)]
pub struct StateCache<T> {
    entries: BTreeMap<u64, Arc<T>>,
    capacity: usize,
}

impl<T> Default for StateCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_CACHE_CAPACITY)
    }
}

impl<T> StateCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Store `state` at `block`, replacing any entry at the same height.
    pub fn insert(&mut self, block: u64, state: Arc<T>) {
        self.entries.insert(block, state);
        while self.entries.len() > self.capacity {
            self.entries.pop_first();
        }
    }

    pub fn get(&self, block: u64) -> Option<Arc<T>> {
        self.entries.get(&block).cloned()
    }

    pub fn latest(&self) -> Option<(u64, Arc<T>)> {
        self.entries
            .last_key_value()
            .map(|(block, state)| (*block, state.clone()))
    }

    /// Drop every entry above `block`.
    pub fn truncate_after(&mut self, block: u64) {
        if let Some(next) = block.checked_add(1) {
            self.entries.split_off(&next);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_height() {
        let mut cache = StateCache::new(3);
        for block in [10u64, 11, 12, 13] {
            cache.insert(block, Arc::new(block));
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.get(10).is_none());
        assert_eq!(cache.get(13).as_deref(), Some(&13));
        assert_eq!(cache.latest().map(|(b, _)| b), Some(13));
    }

    #[test]
    fn test_same_height_overwrites() {
        let mut cache = StateCache::new(4);
        cache.insert(5, Arc::new("first"));
        cache.insert(5, Arc::new("second"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(5).as_deref(), Some(&"second"));
    }

    #[test]
    fn test_truncate_after() {
        let mut cache = StateCache::default();
        for block in 1u64..=5 {
            cache.insert(block, Arc::new(block));
        }
        cache.truncate_after(3);
        assert_eq!(cache.latest().map(|(b, _)| b), Some(3));
        assert_eq!(cache.len(), 3);

        cache.truncate_after(u64::MAX);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut cache = StateCache::new(0);
        cache.insert(1, Arc::new(()));
        cache.insert(2, Arc::new(()));
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(2).is_some());
    }
}
