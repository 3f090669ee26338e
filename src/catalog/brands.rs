use super::{CatalogStore, ImageUpload};
use crate::core::error::StoreError;
use crate::core::model::{Brand, generate_id};
use tracing::{debug, info};

/// What to do with a brand's logo on add or edit.
#[derive(Debug, Clone)]
pub enum LogoSource {
    /// Leave the current logo as it is.
    Keep,
    Remove,
    /// Externally hosted logo.
    Url(String),
    Upload(ImageUpload),
}

/// Admin operations on the brand collection. Every change rewrites the whole
/// collection, so each one starts from a fresh read and refuses to run on a
/// degraded copy. Replaced logos are only deleted once the save went through.
pub struct BrandManager<'a> {
    store: &'a CatalogStore,
}

/// Logo state of a pending save.
struct LogoChange {
    logo_url: Option<String>,
    /// Deleted after a successful save.
    stale: Option<String>,
    /// Uploaded for this change; deleted if the save fails.
    uploaded: Option<String>,
}

impl<'a> BrandManager<'a> {
    pub fn new(store: &'a CatalogStore) -> Self {
        Self { store }
    }

    pub async fn add(&self, name: &str, logo: LogoSource) -> Result<Brand, StoreError> {
        let mut brands: Vec<Brand> = self.store.fetch_current().await?;
        let change = self.prepare_logo(None, logo).await?;
        let brand = Brand {
            id: generate_id("brand"),
            name: name.trim().to_string(),
            logo_url: change.logo_url.clone(),
        };

        brands.push(brand.clone());
        self.commit(&brands, change).await?;
        info!("Added brand {} ({})", brand.name, brand.id);
        Ok(brand)
    }

    pub async fn update(
        &self,
        id: &str,
        name: Option<&str>,
        logo: LogoSource,
    ) -> Result<Brand, StoreError> {
        let mut brands: Vec<Brand> = self.store.fetch_current().await?;
        let index = position(&brands, id)?;

        let current_logo = brands[index].logo_url.clone();
        let change = self.prepare_logo(current_logo, logo).await?;

        let brand = &mut brands[index];
        if let Some(name) = name {
            brand.name = name.trim().to_string();
        }
        brand.logo_url = change.logo_url.clone();
        let updated = brand.clone();

        self.commit(&brands, change).await?;
        info!("Updated brand {} ({})", updated.name, updated.id);
        Ok(updated)
    }

    /// Removes the brand and, when it was uploaded to our store, its logo.
    pub async fn remove(&self, id: &str) -> Result<Brand, StoreError> {
        let mut brands: Vec<Brand> = self.store.fetch_current().await?;
        let index = position(&brands, id)?;
        let removed = brands.remove(index);

        let change = LogoChange {
            logo_url: None,
            stale: removed.logo_url.clone(),
            uploaded: None,
        };
        self.commit(&brands, change).await?;
        info!("Removed brand {} ({})", removed.name, removed.id);
        Ok(removed)
    }

    async fn prepare_logo(
        &self,
        current: Option<String>,
        logo: LogoSource,
    ) -> Result<LogoChange, StoreError> {
        let change = match logo {
            LogoSource::Keep => LogoChange {
                logo_url: current,
                stale: None,
                uploaded: None,
            },
            LogoSource::Remove => LogoChange {
                logo_url: None,
                stale: current,
                uploaded: None,
            },
            LogoSource::Url(url) => LogoChange {
                stale: current.filter(|logo| *logo != url),
                logo_url: Some(url),
                uploaded: None,
            },
            LogoSource::Upload(upload) => {
                let url = self.store.upload_image(upload).await?;
                LogoChange {
                    logo_url: Some(url.clone()),
                    stale: current,
                    uploaded: Some(url),
                }
            }
        };
        Ok(change)
    }

    async fn commit(&self, brands: &[Brand], change: LogoChange) -> Result<(), StoreError> {
        match self.store.save_brands(brands).await {
            Ok(()) => {
                if let Some(logo) = change.stale {
                    debug!("Discarding previous logo");
                    self.store.delete_image(&logo).await;
                }
                Ok(())
            }
            Err(e) => {
                if let Some(logo) = change.uploaded {
                    debug!("Discarding logo uploaded for the failed save");
                    self.store.delete_image(&logo).await;
                }
                Err(e)
            }
        }
    }
}

fn position(brands: &[Brand], id: &str) -> Result<usize, StoreError> {
    brands
        .iter()
        .position(|brand| brand.id == id)
        .ok_or_else(|| StoreError::UnknownBrand(id.to_string()))
}
