use crate::core::cache::Cache;
use crate::core::holding::{Holding, HoldingPatch};
use crate::store::HoldingStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

struct CacheValue<V> {
    value: V,
    expires_at: Option<Instant>,
}

/// In-memory cache implementation using HashMap and Mutex
pub struct MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, CacheValue<V>>>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of entries held, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let cache = self.inner.lock().await;
        if let Some(entry) = cache.get(key) {
            if let Some(expiry) = entry.expires_at
                && expiry <= Instant::now()
            {
                debug!("Cache entry expired for key: {:?}", key);
                return None;
            }
            debug!("Cache HIT for key: {:?}", key);
            return Some(entry.value.clone());
        }
        debug!("Cache MISS for key: {:?}", key);
        None
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let cache_value = CacheValue { value, expires_at };

        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, cache_value);
    }
}

/// Holdings kept in process memory. Used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryHoldingStore {
    holdings: Mutex<HashMap<Uuid, Holding>>,
}

impl MemoryHoldingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HoldingStore for MemoryHoldingStore {
    async fn list(&self, owner: &str) -> Result<Vec<Holding>> {
        let holdings = self.holdings.lock().await;
        let mut owned: Vec<Holding> = holdings
            .values()
            .filter(|h| h.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn get(&self, owner: &str, id: Uuid) -> Result<Option<Holding>> {
        let holdings = self.holdings.lock().await;
        Ok(holdings.get(&id).filter(|h| h.owner == owner).cloned())
    }

    async fn create(&self, holding: Holding) -> Result<()> {
        let mut holdings = self.holdings.lock().await;
        if holdings.contains_key(&holding.id) {
            return Err(anyhow!("Holding {} already exists", holding.id));
        }
        holdings.insert(holding.id, holding);
        Ok(())
    }

    async fn update(&self, owner: &str, id: Uuid, patch: &HoldingPatch) -> Result<Holding> {
        let mut holdings = self.holdings.lock().await;
        let holding = holdings
            .get_mut(&id)
            .filter(|h| h.owner == owner)
            .ok_or_else(|| anyhow!("Holding {} not found", id))?;
        patch.apply(holding)?;
        Ok(holding.clone())
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool> {
        let mut holdings = self.holdings.lock().await;
        if holdings.get(&id).is_some_and(|h| h.owner == owner) {
            holdings.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AssetClass;
    use crate::core::holding::NewHolding;
    use chrono::{Duration as ChronoDuration, Utc};
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = MemoryCache::<String, i32>::new();

        // Initially, cache is empty
        assert!(cache.get(&"key1".to_string()).await.is_none());

        // Put a value without TTL
        cache.put("key1".to_string(), 123, None).await;

        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));
        assert!(cache.get(&"key2".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_ttl_expiration() {
        let cache = MemoryCache::<String, i32>::new();

        cache
            .put("key1".to_string(), 123, Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());

        // Expired entries are not purged, only skipped
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_cache_put_overwrites_expired_entry() {
        let cache = MemoryCache::<String, i32>::new();

        cache
            .put("key1".to_string(), 1, Some(Duration::from_millis(5)))
            .await;
        sleep(Duration::from_millis(10)).await;
        cache.put("key1".to_string(), 2, None).await;

        assert_eq!(cache.get(&"key1".to_string()).await, Some(2));
        assert_eq!(cache.len().await, 1);
    }

    fn holding(owner: &str, symbol: &str, age_minutes: i64) -> Holding {
        let mut holding = NewHolding {
            symbol: symbol.to_string(),
            asset_class: AssetClass::Equity,
            quantity: 1.0,
            buy_price: 10.0,
        }
        .into_holding(owner)
        .unwrap();
        holding.created_at = Utc::now() - ChronoDuration::minutes(age_minutes);
        holding
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped_and_newest_first() {
        let store = MemoryHoldingStore::new();
        store.create(holding("alice", "OLD", 30)).await.unwrap();
        store.create(holding("alice", "NEW", 1)).await.unwrap();
        store.create(holding("bob", "BOB", 10)).await.unwrap();

        let listed = store.list("alice").await.unwrap();
        let symbols: Vec<_> = listed.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["NEW", "OLD"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_reject_other_owner() {
        let store = MemoryHoldingStore::new();
        let h = holding("alice", "AAPL", 0);
        let id = h.id;
        store.create(h).await.unwrap();

        let patch = HoldingPatch {
            quantity: Some(5.0),
            ..Default::default()
        };
        assert!(store.update("bob", id, &patch).await.is_err());
        assert!(!store.delete("bob", id).await.unwrap());

        let updated = store.update("alice", id, &patch).await.unwrap();
        assert_eq!(updated.quantity, 5.0);
        assert!(store.delete("alice", id).await.unwrap());
        assert!(store.get("alice", id).await.unwrap().is_none());
    }
}
