// Keyed TTL cache
// Expired entries are treated as absent; nothing evicts them eagerly, the
// next insert for the key overwrites.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::Clock;

struct Entry<V> {
    value: V,
    fetched_at: Instant,
}

pub struct TtlCache<K, V> {
    entries: HashMap<K, Entry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { entries: HashMap::new(), ttl, clock }
    }

    /// Fresh value for `key`, or None when absent or past the TTL.
    pub fn get(&self, key: &K) -> Option<&V> {
        let entry = self.entries.get(key)?;
        if self.clock.now() - entry.fetched_at >= self.ttl {
            return None;
        }
        Some(&entry.value)
    }

    /// Store `value` with the current timestamp, replacing any prior entry.
    pub fn insert(&mut self, key: K, value: V) {
        self.entries.insert(key, Entry { value, fetched_at: self.clock.now() });
    }

    /// Age of the entry for `key`, expired or not.
    pub fn age(&self, key: &K) -> Option<Duration> {
        self.entries
            .get(key)
            .map(|entry| self.clock.now() - entry.fetched_at)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
