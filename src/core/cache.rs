use async_trait::async_trait;
use std::time::Duration;

/// Key-value cache with optional per-entry time-to-live.
///
/// Expired entries read as misses. Implementations evict lazily and make each
/// operation atomic on its own; nothing spans more than one key.
#[async_trait]
pub trait Cache<K, V>: Send + Sync {
    async fn get(&self, key: &K) -> Option<V>;

    async fn put(&self, key: K, value: V, ttl: Option<Duration>);
}
