use crate::core::cache::{CacheEntry, KeyValueCollection};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection, used when nothing should outlive the process.
pub struct MemoryCollection {
    inner: Mutex<HashMap<String, CacheEntry<Value>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.inner.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_valid() => {
                debug!("Cache HIT for key: {}", key);
                Some(entry.data.clone())
            }
            Some(_) => {
                debug!("Cache entry expired for key: {}", key);
                entries.remove(key);
                None
            }
            None => {
                debug!("Cache MISS for key: {}", key);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let mut entries = self.inner.lock().await;
        debug!("Cache PUT for key: {}", key);
        entries.insert(key.to_string(), CacheEntry::new(value, ttl));
    }

    async fn remove(&self, key: &str) {
        let mut entries = self.inner.lock().await;
        entries.remove(key);
        debug!("Cache REMOVE for key: {}", key);
    }

    async fn clear(&self) {
        let mut entries = self.inner.lock().await;
        entries.clear();
        debug!("Cache CLEAR");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_memory_get_put() {
        let collection = MemoryCollection::new();

        assert!(collection.get("brands_cache").await.is_none());

        collection.put("brands_cache", json!([]), None).await;
        assert_eq!(collection.get("brands_cache").await, Some(json!([])));

        assert!(collection.get("products_cache").await.is_none());
    }

    #[tokio::test]
    async fn test_memory_ttl_expiration() {
        let collection = MemoryCollection::new();

        collection
            .put("categories_cache", json!([1]), Some(Duration::from_millis(10)))
            .await;
        assert_eq!(collection.get("categories_cache").await, Some(json!([1])));

        sleep(Duration::from_millis(20)).await;
        assert!(collection.get("categories_cache").await.is_none());
    }

    #[tokio::test]
    async fn test_memory_remove_and_clear() {
        let collection = MemoryCollection::new();

        collection.put("a", json!(1), None).await;
        collection.put("b", json!(2), None).await;

        collection.remove("a").await;
        assert!(collection.get("a").await.is_none());
        assert_eq!(collection.get("b").await, Some(json!(2)));

        collection.clear().await;
        assert!(collection.get("b").await.is_none());
    }
}
