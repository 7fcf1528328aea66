//! In-memory TTL cache for computed chart series.
//!
//! Entries expire a fixed duration after insertion. Expired entries are invisible
//! to `get` immediately and are physically removed by `purge_expired`, which the
//! background sweeper calls periodically. There is no size bound: the key space is
//! indicator x range x flags.
//!
//! The table is split into shards, each behind its own `RwLock`, so a write only
//! blocks readers of keys that hash to the same shard.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

const SHARD_COUNT: usize = 16;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expire_at: Instant,
}

pub struct ResultCache<V> {
    shards: Vec<RwLock<HashMap<String, CacheEntry<V>>>>,
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> ResultCache<V> {
    pub fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT).map(|_| RwLock::new(HashMap::new())).collect(),
        }
    }

    fn shard(&self, key: &str) -> &RwLock<HashMap<String, CacheEntry<V>>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Lookup as seen at `now`. An expired entry reads as absent even before it is swept.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let shard = self.shard(key).read();
        shard
            .get(key)
            .filter(|entry| now < entry.expire_at)
            .map(|entry| entry.value.clone())
    }

    /// Inserts or fully replaces the entry for `key`.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let expire_at = Instant::now() + ttl;
        self.shard(&key)
            .write()
            .insert(key, CacheEntry { value, expire_at });
    }

    pub fn delete(&self, key: &str) {
        self.shard(key).write().remove(key);
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// Drops every entry expired at `now`; returns how many were removed.
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut removed = 0;
        for shard in &self.shards {
            let mut table = shard.write();
            let before = table.len();
            table.retain(|_, entry| now < entry.expire_at);
            removed += before - table.len();
        }
        removed
    }

    /// Number of stored entries, expired-but-unswept ones included.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
