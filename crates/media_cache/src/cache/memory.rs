use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;

use crate::cache::{CacheStats, ResponseCache};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

/// In-memory cache with a fixed capacity and a time-to-live.
///
/// Expired entries are never returned. When full, an insert first drops
/// expired entries and then, if still full, evicts the oldest entry.
/// A zero capacity or zero TTL disables the cache entirely.
#[derive(Debug)]
pub struct MemoryCache<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    capacity: usize,
    ttl: TimeDelta,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> MemoryCache<V> {
    pub fn new(capacity: usize, ttl: std::time::Duration) -> Self {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);

        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity.min(1024))),
            capacity,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0, std::time::Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0 && self.ttl > TimeDelta::zero()
    }

    fn is_expired(&self, entry: &Entry<V>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.inserted_at) >= self.ttl
    }

    pub(crate) async fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }

        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !self.is_expired(entry, now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub(crate) async fn insert_at(&self, key: String, value: V, now: DateTime<Utc>) {
        if !self.is_enabled() {
            return;
        }

        let mut entries = self.entries.write().await;

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            entries.retain(|_, entry| !self.is_expired(entry, now));

            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(key, _)| key.clone());

                if let Some(oldest) = oldest {
                    tracing::debug!(key = %oldest, "Evicting oldest cache entry");
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
            },
        );
    }

    pub(crate) async fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        before - entries.len()
    }
}

impl<V> ResponseCache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Utc::now()).await
    }

    async fn insert(&self, key: String, value: V) {
        self.insert_at(key, value, Utc::now()).await
    }

    async fn purge_expired(&self) -> usize {
        let removed = self.purge_expired_at(Utc::now()).await;
        if removed > 0 {
            tracing::debug!(removed, "Purged expired cache entries");
        }
        removed
    }

    async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.read().await.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
