use crate::core::cache::{CacheEntry, KeyValueCollection};
use anyhow::Result;
use async_trait::async_trait;
use fjall::PartitionHandle;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Collection backed by a fjall partition. Entries are stored as JSON
/// `CacheEntry` documents so they stay readable across sessions.
pub struct DiskCollection {
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(partition: PartitionHandle) -> Self {
        Self { partition }
    }

    fn read(&self, key: &str) -> Result<Option<Value>> {
        let Some(raw) = self.partition.get(key)? else {
            debug!("Cache MISS for key: {}", key);
            return Ok(None);
        };
        let entry: CacheEntry<Value> = serde_json::from_slice(&raw)?;
        if !entry.is_valid() {
            debug!("Cache entry expired for key: {}", key);
            self.partition.remove(key)?;
            return Ok(None);
        }
        debug!("Cache HIT for key: {}", key);
        Ok(Some(entry.data))
    }

    fn write(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry::new(value, ttl);
        self.partition.insert(key, serde_json::to_vec(&entry)?)?;
        debug!("Cache PUT for key: {}", key);
        Ok(())
    }

    fn remove_all(&self) -> Result<()> {
        let keys = self
            .partition
            .keys()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for key in keys {
            self.partition.remove(key)?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &str) -> Option<Value> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                debug!("DiskCollection get error for key {}: {}", key, e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: Value, ttl: Option<Duration>) {
        if let Err(e) = self.write(key, value, ttl) {
            debug!("DiskCollection put error for key {}: {}", key, e);
        }
    }

    async fn remove(&self, key: &str) {
        match self.partition.remove(key) {
            Ok(()) => debug!("Cache REMOVE for key: {}", key),
            Err(e) => debug!("DiskCollection remove error for key {}: {}", key, e),
        }
    }

    async fn clear(&self) {
        match self.remove_all() {
            Ok(()) => debug!("Cache CLEAR"),
            Err(e) => debug!("DiskCollection clear error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::PartitionCreateOptions;
    use serde_json::json;
    use tempfile::tempdir;
    use tokio::time::sleep;

    fn open(path: &std::path::Path) -> DiskCollection {
        let keyspace = fjall::Config::new(path).open().unwrap();
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        DiskCollection::new(partition)
    }

    #[tokio::test]
    async fn test_disk_get_put() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        assert!(collection.get("brands").await.is_none());

        collection
            .put("brands", json!([{"id": "brand_1"}]), None)
            .await;
        assert_eq!(
            collection.get("brands").await,
            Some(json!([{"id": "brand_1"}]))
        );
    }

    #[tokio::test]
    async fn test_disk_ttl_expiration() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        collection
            .put("brands_cache", json!([]), Some(Duration::from_millis(10)))
            .await;
        assert_eq!(collection.get("brands_cache").await, Some(json!([])));

        sleep(Duration::from_millis(20)).await;
        assert!(collection.get("brands_cache").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_remove_and_clear() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        collection.put("a", json!(1), None).await;
        collection.put("b", json!(2), None).await;

        collection.remove("a").await;
        assert!(collection.get("a").await.is_none());

        collection.clear().await;
        assert!(collection.get("b").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_entry_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let keyspace = fjall::Config::new(dir.path()).open().unwrap();
            let partition = keyspace
                .open_partition("test", PartitionCreateOptions::default())
                .unwrap();
            let collection = DiskCollection::new(partition);
            collection.put("categories", json!(["kept"]), None).await;
            keyspace.persist(fjall::PersistMode::SyncAll).unwrap();
        }
        let collection = open(dir.path());
        assert_eq!(collection.get("categories").await, Some(json!(["kept"])));
    }
}
