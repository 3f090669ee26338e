use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A value stored in a local collection together with its freshness window.
///
/// `timestamp` and `ttl` are milliseconds. An entry without a ttl never expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub data: V,
    pub timestamp: i64,
    pub ttl: Option<i64>,
}

impl<V> CacheEntry<V> {
    pub fn new(data: V, ttl: Option<Duration>) -> Self {
        Self {
            data,
            timestamp: now_millis(),
            ttl: ttl.map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX)),
        }
    }

    pub fn is_valid_at(&self, now: i64) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_sub(self.timestamp) < ttl,
            None => true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_millis())
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A named bucket of JSON values. Storage failures are reported as misses.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn put(&self, key: &str, value: Value, ttl: Option<Duration>);
    async fn remove(&self, key: &str);
    async fn clear(&self);
}

pub trait Store: Send + Sync {
    /// Returns the collection called `name`, creating it when asked to.
    ///
    /// `persist` selects the on-disk backend; `None` means the backend is
    /// unavailable or the collection does not exist.
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;
}
