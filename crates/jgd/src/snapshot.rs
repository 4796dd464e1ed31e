//
// snapshot.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! A bounded ring of opaque host-runtime plot snapshots (§3, §9). `S` is
//! whatever handle type the host integration uses to keep a snapshot
//! alive (e.g. a reference-preserving wrapper around a host object); this
//! module only manages the ring's eviction policy.

use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 16;

pub struct SnapshotStore<S> {
    ring: VecDeque<S>,
    capacity: usize,
}

impl<S> SnapshotStore<S> {
    pub fn new(capacity: usize) -> Self {
        SnapshotStore { ring: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Push the most recently completed snapshot. Returns the evicted
    /// oldest entry, if the store was already at capacity.
    pub fn push(&mut self, snapshot: S) -> Option<S> {
        self.ring.push_back(snapshot);
        if self.ring.len() > self.capacity {
            self.ring.pop_front()
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.ring.get(index)
    }

    pub fn clear(&mut self) {
        self.ring.clear();
    }
}

impl<S> Default for SnapshotStore<S> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut store: SnapshotStore<u32> = SnapshotStore::new(2);
        assert_eq!(store.push(1), None);
        assert_eq!(store.push(2), None);
        assert_eq!(store.push(3), Some(1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0), Some(&2));
        assert_eq!(store.get(1), Some(&3));
    }

    #[test]
    fn default_capacity_is_sixteen() {
        let store: SnapshotStore<u32> = SnapshotStore::default();
        assert_eq!(store.capacity, DEFAULT_CAPACITY);
    }
}
