use std::future::Future;

pub mod memory;

pub trait ResponseCache<V> {
    /// Returns the cached value for `key` unless it is missing or expired.
    fn get(&self, key: &str) -> impl Future<Output = Option<V>> + Send;

    fn insert(&self, key: String, value: V) -> impl Future<Output = ()> + Send;

    /// Drops every expired entry, returning how many were removed.
    fn purge_expired(&self) -> impl Future<Output = usize> + Send;

    fn stats(&self) -> impl Future<Output = CacheStats> + Send;
}

impl<V, T> ResponseCache<V> for &T
where
    V: Send,
    T: ResponseCache<V> + Send + Sync,
{
    async fn get(&self, key: &str) -> Option<V> {
        (**self).get(key).await
    }

    async fn insert(&self, key: String, value: V) {
        (**self).insert(key, value).await
    }

    async fn purge_expired(&self) -> usize {
        (**self).purge_expired().await
    }

    async fn stats(&self) -> CacheStats {
        (**self).stats().await
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}
