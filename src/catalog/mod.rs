//! Read-through access to the catalog collections stored as JSON blobs.
//!
//! Reads never fail: a missing blob yields the built-in defaults, and any
//! other failure falls back to the cache, then the local mirror, then the
//! defaults. Writes replace a whole collection and raise on any non-2xx
//! response.

pub mod brands;
pub mod images;

use crate::blob::util::redacted;
use crate::blob::{BlobTransport, HttpBlobTransport};
use crate::core::cache::{KeyValueCollection, Store};
use crate::core::config::{AppConfig, CacheConfig, StorageConfig};
use crate::core::credential::{AccessTokenProvider, EnvToken, StaticToken};
use crate::core::endpoint::{BlobEndpoint, ReadCredential};
use crate::core::error::StoreError;
use crate::core::model::{Brand, CatalogRecord, Category, Collection, Product};
use crate::store::memory::MemoryCollection;
use anyhow::{Context, anyhow};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub use brands::{BrandManager, LogoSource};
pub use images::{ImageUpload, PLACEHOLDER_IMAGE};

const CACHE_COLLECTION: &str = "catalog_cache";
const MIRROR_COLLECTION: &str = "catalog_mirror";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Where the catalog lives and how long reads stay fresh.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub endpoint: BlobEndpoint,
    pub data_container: String,
    pub images_container: String,
    pub read_credential: Option<ReadCredential>,
    pub ttl: Duration,
}

impl CatalogSettings {
    pub fn from_config(storage: &StorageConfig, cache: &CacheConfig) -> Result<Self, StoreError> {
        Ok(Self {
            endpoint: BlobEndpoint::parse(&storage.endpoint_url())?,
            data_container: storage.data_container.clone(),
            images_container: storage.images_container.clone(),
            read_credential: storage
                .read_sas_token
                .as_deref()
                .and_then(ReadCredential::new),
            ttl: cache.ttl(),
        })
    }
}

pub struct CatalogStore {
    settings: CatalogSettings,
    transport: Arc<dyn BlobTransport>,
    credentials: Arc<dyn AccessTokenProvider>,
    cache: Arc<dyn KeyValueCollection>,
    mirror: Arc<dyn KeyValueCollection>,
}

enum RemoteRead<T> {
    Found(Vec<T>),
    Missing,
}

impl CatalogStore {
    pub fn new(
        settings: CatalogSettings,
        transport: Arc<dyn BlobTransport>,
        credentials: Arc<dyn AccessTokenProvider>,
        store: &dyn Store,
    ) -> Self {
        Self {
            settings,
            transport,
            credentials,
            cache: open_collection(store, CACHE_COLLECTION),
            mirror: open_collection(store, MIRROR_COLLECTION),
        }
    }

    /// Builds a store talking HTTP to the configured account, with the
    /// bearer token read from `auth.token_env`.
    pub fn from_config(config: &AppConfig, store: &dyn Store) -> anyhow::Result<Self> {
        let settings = CatalogSettings::from_config(&config.storage, &config.cache)
            .context("Invalid storage configuration")?;
        let transport = HttpBlobTransport::new(
            &config.storage.api_version,
            config.storage.read_retries,
        )?;
        let credentials: Arc<dyn AccessTokenProvider> = match &config.auth.token_env {
            Some(var) => Arc::new(EnvToken::new(var)),
            None => Arc::new(StaticToken::anonymous()),
        };
        Ok(Self::new(settings, Arc::new(transport), credentials, store))
    }

    /// Returns the collection for `T`, from cache when fresh.
    #[instrument(name = "FetchCollection", skip(self), fields(collection = %T::COLLECTION))]
    pub async fn fetch<T: CatalogRecord>(&self) -> Vec<T> {
        let collection = T::COLLECTION;
        if let Some(cached) = self.cached::<T>(collection).await {
            debug!("Using cached {}", collection);
            return cached;
        }

        match self.load::<T>(collection).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Failed to fetch {}, falling back to local data", collection);
                self.fallback::<T>(collection).await
            }
        }
    }

    /// Like `fetch`, but a failed remote read is an error instead of a
    /// fallback. Used before read-modify-write so a degraded list is never
    /// written back.
    pub(crate) async fn fetch_current<T: CatalogRecord>(&self) -> Result<Vec<T>, StoreError> {
        let collection = T::COLLECTION;
        if let Some(cached) = self.cached::<T>(collection).await {
            return Ok(cached);
        }
        self.load::<T>(collection)
            .await
            .map_err(|e| StoreError::read_failed(collection.name(), e))
    }

    /// Replaces the whole collection for `T`.
    ///
    /// The local mirror is written first and restored if the store rejects
    /// the write. On success the cache entry is dropped so the next read goes
    /// to the store.
    #[instrument(name = "SaveCollection", skip_all, fields(collection = %T::COLLECTION, items = items.len()))]
    pub async fn save<T: CatalogRecord>(&self, items: &[T]) -> Result<(), StoreError> {
        let collection = T::COLLECTION;
        let snapshot = serde_json::to_value(items)?;
        let body = serde_json::to_vec(items)?;
        let url = self
            .settings
            .endpoint
            .blob_url(&self.settings.data_container, &collection.blob_name())?;

        let previous = self.mirror.get(collection.mirror_key()).await;
        self.mirror
            .put(collection.mirror_key(), snapshot, None)
            .await;

        match self
            .put_blob(&url, body, JSON_CONTENT_TYPE, collection.name())
            .await
        {
            Ok(()) => {
                self.cache.remove(collection.cache_key()).await;
                info!("Saved {} {}", items.len(), collection);
                Ok(())
            }
            Err(e) => {
                self.rollback_mirror(collection, previous).await;
                Err(e)
            }
        }
    }

    /// Drops one cached collection, or all of them.
    pub async fn clear_cache(&self, collection: Option<Collection>) {
        match collection {
            Some(collection) => {
                self.cache.remove(collection.cache_key()).await;
                info!("Cache cleared: {}", collection.cache_key());
            }
            None => {
                self.cache.clear().await;
                info!("All caches cleared");
            }
        }
    }

    pub async fn fetch_categories(&self) -> Vec<Category> {
        self.fetch().await
    }

    pub async fn fetch_brands(&self) -> Vec<Brand> {
        self.fetch().await
    }

    pub async fn fetch_products(&self) -> Vec<Product> {
        self.fetch().await
    }

    pub async fn save_categories(&self, categories: &[Category]) -> Result<(), StoreError> {
        self.save(categories).await
    }

    pub async fn save_brands(&self, brands: &[Brand]) -> Result<(), StoreError> {
        self.save(brands).await
    }

    pub async fn save_products(&self, products: &[Product]) -> Result<(), StoreError> {
        self.save(products).await
    }

    /// Remote read that caches what it finds. A missing blob yields the
    /// defaults.
    async fn load<T: CatalogRecord>(&self, collection: Collection) -> anyhow::Result<Vec<T>> {
        match self.fetch_remote::<T>(collection).await? {
            RemoteRead::Found(items) => {
                let items = if items.is_empty() && T::defaults_when_empty() {
                    T::defaults()
                } else {
                    items
                };
                debug!("Fetched {} {}", items.len(), collection);
                self.remember(collection, &items).await;
                Ok(items)
            }
            RemoteRead::Missing => {
                info!("{} not found in store, using defaults", collection);
                let defaults = T::defaults();
                self.put_cached(collection, &defaults).await;
                Ok(defaults)
            }
        }
    }

    async fn fetch_remote<T: CatalogRecord>(
        &self,
        collection: Collection,
    ) -> anyhow::Result<RemoteRead<T>> {
        let mut url = self
            .settings
            .endpoint
            .blob_url(&self.settings.data_container, &collection.blob_name())?;
        if let Some(credential) = &self.settings.read_credential {
            credential.apply(&mut url);
        }
        debug!("Requesting {} from {}", collection, redacted(&url));

        let response = self.transport.get(&url).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Ok(RemoteRead::Missing);
        }
        if !response.status.is_success() {
            return Err(anyhow!(
                "store responded {} for {}",
                response.status,
                redacted(&url)
            ));
        }

        let items: Vec<T> = serde_json::from_slice(&response.body)
            .with_context(|| format!("Failed to parse {}", collection.blob_name()))?;
        Ok(RemoteRead::Found(items))
    }

    async fn fallback<T: CatalogRecord>(&self, collection: Collection) -> Vec<T> {
        if let Some(cached) = self.cached::<T>(collection).await {
            return cached;
        }
        if let Some(mirrored) = decode::<T>(self.mirror.get(collection.mirror_key()).await) {
            debug!("Using local copy of {}", collection);
            return mirrored;
        }
        T::defaults()
    }

    async fn cached<T: CatalogRecord>(&self, collection: Collection) -> Option<Vec<T>> {
        decode(self.cache.get(collection.cache_key()).await)
    }

    async fn put_cached<T: CatalogRecord>(&self, collection: Collection, items: &[T]) {
        match serde_json::to_value(items) {
            Ok(value) => {
                self.cache
                    .put(collection.cache_key(), value, Some(self.settings.ttl))
                    .await
            }
            Err(e) => debug!("Could not cache {}: {}", collection, e),
        }
    }

    async fn remember<T: CatalogRecord>(&self, collection: Collection, items: &[T]) {
        match serde_json::to_value(items) {
            Ok(value) => {
                self.cache
                    .put(collection.cache_key(), value.clone(), Some(self.settings.ttl))
                    .await;
                self.mirror.put(collection.mirror_key(), value, None).await;
            }
            Err(e) => debug!("Could not cache {}: {}", collection, e),
        }
    }

    async fn rollback_mirror(&self, collection: Collection, previous: Option<Value>) {
        debug!("Rolling back local copy of {}", collection);
        match previous {
            Some(value) => self.mirror.put(collection.mirror_key(), value, None).await,
            None => self.mirror.remove(collection.mirror_key()).await,
        }
    }

    /// Authenticated PUT; any non-2xx status is a `WriteRejected`.
    async fn put_blob(
        &self,
        url: &Url,
        body: Vec<u8>,
        content_type: &str,
        target: &str,
    ) -> Result<(), StoreError> {
        let token = self
            .credentials
            .access_token()
            .await
            .map_err(StoreError::credential)?;
        let response = self
            .transport
            .put(url, body, content_type, token.as_deref())
            .await
            .map_err(|e| StoreError::transport(redacted(url), e))?;
        if !response.status.is_success() {
            warn!(status = %response.status, "Store rejected write of {}", target);
            return Err(StoreError::WriteRejected {
                target: target.to_string(),
                status: response.status,
            });
        }
        Ok(())
    }
}

fn open_collection(store: &dyn Store, name: &str) -> Arc<dyn KeyValueCollection> {
    store
        .get_collection(name, true, true)
        .or_else(|| {
            debug!("Persistent collection {} unavailable, keeping it in memory", name);
            store.get_collection(name, false, true)
        })
        .unwrap_or_else(|| Arc::new(MemoryCollection::new()))
}

fn decode<T: CatalogRecord>(value: Option<Value>) -> Option<Vec<T>> {
    serde_json::from_value(value?)
        .inspect_err(|e| debug!("Ignoring undecodable local entry: {}", e))
        .ok()
}
