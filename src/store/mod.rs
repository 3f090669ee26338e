pub mod disk;
pub mod memory;

use crate::core::cache::{KeyValueCollection, Store};
use crate::core::config::AppConfig;
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::{debug, warn};

/// A thread-safe key-value store that can hold multiple collections.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Keyspace>,
}

impl KeyValueStore {
    /// Opens the on-disk keyspace under `<data path>/cache`. Falls back to a
    /// memory-only store when the keyspace cannot be opened.
    pub fn new(config: &AppConfig) -> Self {
        let keyspace = config
            .default_data_path()
            .ok()
            .and_then(|path| {
                let cache_dir = path.join("cache");
                fjall::Config::new(&cache_dir)
                    .open()
                    .inspect_err(|e| {
                        warn!("Could not open cache at {}: {}", cache_dir.display(), e)
                    })
                    .ok()
            });

        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let keyspace = fjall::Config::new(path).open()?;
        Ok(Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: Some(keyspace),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    fn create(&self, name: &str, persist: bool) -> Option<Arc<dyn KeyValueCollection>> {
        if !persist {
            return Some(Arc::new(MemoryCollection::new()));
        }
        let keyspace = self.keyspace.as_ref()?;
        match keyspace.open_partition(name, PartitionCreateOptions::default()) {
            Ok(partition) => Some(Arc::new(DiskCollection::new(partition))),
            Err(e) => {
                warn!("Could not open partition {}: {}", name, e);
                None
            }
        }
    }
}

impl Store for KeyValueStore {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>> {
        if let Some(existing) = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Some(Arc::clone(existing));
        }
        if !create_if_missing {
            return None;
        }

        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = collections.get(name) {
            return Some(Arc::clone(existing));
        }
        let collection = self.create(name, persist)?;
        debug!("Opened collection {} (persist: {})", name, persist);
        collections.insert(name.to_string(), Arc::clone(&collection));
        Some(collection)
    }
}
