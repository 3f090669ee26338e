use super::CatalogStore;
use crate::blob::util::redacted;
use crate::core::cache::now_millis;
use crate::core::endpoint::BlobEndpoint;
use crate::core::error::StoreError;
use anyhow::{Context, anyhow};
use reqwest::{StatusCode, Url};
use std::path::Path;
use tracing::{debug, error, info, instrument};

/// Grey "No Image" tile shown for records without an image.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml,%3Csvg xmlns=%22http://www.w3.org/2000/svg%22 width=%22300%22 height=%22300%22%3E%3Crect fill=%22%23ddd%22 width=%22300%22 height=%22300%22/%3E%3Ctext fill=%22%23666%22 font-family=%22Arial%22 font-size=%2220%22 x=%2250%25%22 y=%2250%25%22 text-anchor=%22middle%22 dominant-baseline=%22middle%22%3ENo Image%3C/text%3E%3C/svg%3E";

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads an image from disk, guessing the content type from the extension
    /// unless one is given.
    pub fn from_path(path: &Path, content_type: Option<&str>) -> anyhow::Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("Not a file path: {}", path.display()))?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image: {}", path.display()))?;
        let content_type = content_type
            .map(str::to_string)
            .unwrap_or_else(|| content_type_for(path).to_string());
        Ok(Self::new(file_name, content_type, bytes))
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        Some("bmp") => "image/bmp",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

impl CatalogStore {
    /// Uploads to the images container as `<epoch millis>_<file name>` and
    /// returns the bare blob URL, without any read credential.
    #[instrument(name = "UploadImage", skip_all, fields(file = %upload.file_name, bytes = upload.bytes.len()))]
    pub async fn upload_image(&self, upload: ImageUpload) -> Result<String, StoreError> {
        let blob_name = format!("{}_{}", now_millis(), upload.file_name);
        let url = self
            .settings
            .endpoint
            .blob_url(&self.settings.images_container, &blob_name)?;

        self.put_blob(&url, upload.bytes, &upload.content_type, &blob_name)
            .await?;
        info!("Uploaded image {}", blob_name);
        Ok(url.to_string())
    }

    /// Best-effort delete of an image in our images container. URLs hosted
    /// elsewhere are left alone; failures are logged, never returned.
    #[instrument(name = "DeleteImage", skip(self))]
    pub async fn delete_image(&self, url: &str) {
        if url.trim().is_empty() || !self.owns_image(url) {
            debug!("Not an image in our store, skipping delete");
            return;
        }
        let Some(blob_name) = BlobEndpoint::trailing_segment(url) else {
            debug!("No blob name in image url, skipping delete");
            return;
        };

        if let Err(e) = self.delete_blob(&blob_name).await {
            error!(error = %e, "Error deleting image {}", blob_name);
        }
    }

    /// URL to render `url` with: a placeholder when empty, with the read
    /// credential when it lives in our store.
    pub fn resolve_image_url(&self, url: &str) -> String {
        let url = url.trim();
        if url.is_empty() {
            return PLACEHOLDER_IMAGE.to_string();
        }
        let Some(credential) = &self.settings.read_credential else {
            return url.to_string();
        };

        match Url::parse(url) {
            Ok(mut absolute) => {
                if self.owns_image(url) {
                    credential.apply(&mut absolute);
                    absolute.to_string()
                } else {
                    url.to_string()
                }
            }
            Err(_) => match self
                .settings
                .endpoint
                .blob_path_url(&self.settings.images_container, url)
            {
                Ok(mut relative) => {
                    credential.apply(&mut relative);
                    relative.to_string()
                }
                Err(e) => {
                    debug!("Could not resolve image path {}: {}", url, e);
                    url.to_string()
                }
            },
        }
    }

    /// Whether `url` points into the configured storage account.
    pub fn owns_image(&self, url: &str) -> bool {
        self.settings.endpoint.owns(url)
    }

    async fn delete_blob(&self, blob_name: &str) -> anyhow::Result<()> {
        let url = self
            .settings
            .endpoint
            .encoded_blob_url(&self.settings.images_container, blob_name)?;
        let token = self.credentials.access_token().await?;
        let response = self.transport.delete(&url, token.as_deref()).await?;

        match response.status {
            status if status.is_success() => {
                info!("Deleted image {}", blob_name);
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                debug!("Image {} already gone", blob_name);
                Ok(())
            }
            status => Err(anyhow!(
                "store responded {} for {}",
                status,
                redacted(&url)
            )),
        }
    }
}
