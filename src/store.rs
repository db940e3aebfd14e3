// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace};

/// Running totals for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    /// Sum of every duration recorded for the action
    ///
    /// Held as `u128` so `u64::MAX` events of `u64::MAX` each still sum exactly.
    pub total_duration: u128,
    /// Number of recorded events, always at least 1
    pub count: u64,
}

impl Aggregate {
    fn first(duration: u64) -> Self {
        Self {
            total_duration: u128::from(duration),
            count: 1,
        }
    }

    fn add(&mut self, duration: u64) {
        self.total_duration += u128::from(duration);
        self.count += 1;
    }

    /// Returns `total_duration / count`, truncated toward zero.
    ///
    /// The result never exceeds the largest recorded duration, so it fits in `u64`.
    pub fn average(&self) -> u64 {
        let average = self.total_duration / u128::from(self.count);
        u64::try_from(average).unwrap_or(u64::MAX)
    }
}

/// One row of a [`AggregateStore::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateEntry {
    pub key: String,
    pub aggregate: Aggregate,
}

/// Thread-safe map from normalized action name to its running totals.
///
/// # Thread Safety
///
/// The map sits behind a single reader-writer lock:
/// - [`update`](Self::update) holds the write lock for one lookup and either an
///   insert or two additions, so the sum and count of an entry always move together
/// - [`snapshot`](Self::snapshot) and the other readers hold the read lock and never
///   block each other
///
/// Each entry in a snapshot is internally consistent. Two entries in the same
/// snapshot are also taken under the same read lock, although callers should not
/// rely on more than per-entry consistency.
///
/// Every critical section is panic-free, so a poisoned lock still guards a valid
/// map and is recovered rather than propagated.
#[derive(Debug, Default)]
pub struct AggregateStore {
    entries: RwLock<HashMap<String, Aggregate>>,
}

impl AggregateStore {
    /// Creates an empty, independent store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Aggregate>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Aggregate>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds one observation of `duration` to `key`, creating the entry if needed.
    ///
    /// `key` is expected to be normalized already.
    pub fn update(&self, key: &str, duration: u64) {
        let mut entries = self.write();
        if let Some(aggregate) = entries.get_mut(key) {
            aggregate.add(duration);
            return;
        }
        entries.insert(key.to_owned(), Aggregate::first(duration));
    }

    /// Copies all entries out of the store.
    pub fn snapshot(&self) -> Vec<AggregateEntry> {
        let snapshot: Vec<AggregateEntry> = self
            .read()
            .iter()
            .map(|(key, aggregate)| AggregateEntry {
                key: key.clone(),
                aggregate: *aggregate,
            })
            .collect();
        trace!("Aggregate snapshot taken: {} entries", snapshot.len());
        snapshot
    }

    /// Returns the totals for a single key.
    pub fn get(&self, key: &str) -> Option<Aggregate> {
        self.read().get(key).copied()
    }

    /// Number of distinct actions recorded.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if nothing has been recorded since creation or the last reset.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Removes every entry.
    ///
    /// Intended for test isolation; it is not part of the service contract.
    pub fn reset(&self) {
        let removed = {
            let mut entries = self.write();
            let removed = entries.len();
            entries.clear();
            removed
        };
        debug!("Aggregate store reset: {} entries removed", removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_initial_state() {
        let store = AggregateStore::new();

        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.snapshot().is_empty());
        assert!(store.get("jump").is_none());
    }

    #[test]
    fn test_update_creates_then_accumulates() {
        let store = AggregateStore::new();

        store.update("jump", 100);
        assert_eq!(
            store.get("jump"),
            Some(Aggregate {
                total_duration: 100,
                count: 1
            })
        );

        store.update("jump", 200);
        store.update("jump", 300);
        let aggregate = store.get("jump").unwrap();
        assert_eq!(aggregate.total_duration, 600);
        assert_eq!(aggregate.count, 3);
        assert_eq!(aggregate.average(), 200);
    }

    #[test]
    fn test_average_truncates() {
        let store = AggregateStore::new();
        store.update("jump", 1);
        store.update("jump", 2);

        assert_eq!(store.get("jump").unwrap().average(), 1);
    }

    #[test]
    fn test_zero_duration_counts() {
        let store = AggregateStore::new();
        store.update("idle", 0);
        store.update("idle", 0);

        let aggregate = store.get("idle").unwrap();
        assert_eq!(aggregate.count, 2);
        assert_eq!(aggregate.average(), 0);
    }

    #[test]
    fn test_total_exceeds_u64_without_losing_precision() {
        let store = AggregateStore::new();
        let max = i64::MAX as u64;
        for _ in 0..3 {
            store.update("long", max);
        }

        let aggregate = store.get("long").unwrap();
        assert_eq!(aggregate.total_duration, 3 * u128::from(max));
        assert_eq!(aggregate.count, 3);
        assert_eq!(aggregate.average(), max);

        store.update("huge", u64::MAX);
        store.update("huge", u64::MAX);
        assert_eq!(store.get("huge").unwrap().average(), u64::MAX);
    }

    #[test]
    fn test_snapshot_contains_every_key() {
        let store = AggregateStore::new();
        store.update("jump", 100);
        store.update("run", 75);

        let mut snapshot = store.snapshot();
        snapshot.sort_by(|a, b| a.key.cmp(&b.key));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].key, "jump");
        assert_eq!(snapshot[1].key, "run");
        assert_eq!(snapshot[1].aggregate.average(), 75);
    }

    #[test]
    fn test_reset() {
        let store = AggregateStore::new();
        store.update("jump", 100);
        store.reset();

        assert!(store.is_empty());
        store.update("jump", 5);
        assert_eq!(store.get("jump").unwrap().count, 1);
    }

    #[test]
    fn test_instances_are_independent() {
        let a = AggregateStore::new();
        let b = AggregateStore::new();
        a.update("jump", 100);

        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let store = Arc::new(AggregateStore::new());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for duration in 1..=1000 {
                        store.update("jump", duration);
                    }
                })
            })
            .collect();

        for handle in threads {
            handle.join().unwrap();
        }

        let aggregate = store.get("jump").unwrap();
        assert_eq!(aggregate.count, 8 * 1000);
        assert_eq!(aggregate.total_duration, 8 * 500_500);
    }

    #[test]
    fn test_snapshot_never_torn() {
        // Every update adds 10, so any consistent read has total == 10 * count.
        let store = Arc::new(AggregateStore::new());
        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    store.update("run", 10);
                }
            })
        };

        for _ in 0..1_000 {
            for entry in store.snapshot() {
                assert_eq!(
                    entry.aggregate.total_duration,
                    10 * u128::from(entry.aggregate.count)
                );
            }
        }

        writer.join().unwrap();
        assert_eq!(store.get("run").unwrap().count, 10_000);
    }
}
