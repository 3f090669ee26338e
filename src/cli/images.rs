use super::ui;
use crate::catalog::{CatalogStore, ImageUpload};
use anyhow::{Context, Result};
use std::path::Path;

pub async fn upload(catalog: &CatalogStore, path: &Path, content_type: Option<&str>) -> Result<()> {
    let upload = ImageUpload::from_path(path, content_type)?;

    let pb = ui::new_spinner(&format!("Uploading {}...", upload.file_name));
    let result = catalog.upload_image(upload).await;
    pb.finish_and_clear();

    let url = result.context("Failed to upload image")?;
    println!("{url}");
    Ok(())
}

/// Deletes are best-effort; the command succeeds even if the store refused.
pub async fn delete(catalog: &CatalogStore, url: &str) -> Result<()> {
    if !catalog.owns_image(url) {
        println!(
            "{}",
            ui::style_text(
                "Image is not hosted in this storage account, nothing to delete.",
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }
    catalog.delete_image(url).await;
    println!("{}", ui::style_text("Image deleted.", ui::StyleType::Success));
    Ok(())
}

pub fn resolve(catalog: &CatalogStore, url: &str) {
    println!("{}", catalog.resolve_image_url(url));
}
