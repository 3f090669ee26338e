use super::ui;
use crate::LogoArgs;
use crate::catalog::{BrandManager, CatalogStore, ImageUpload, LogoSource};
use anyhow::{Context, Result, bail};

impl LogoArgs {
    /// Turns the command line flags into a logo change. With no flags the
    /// current logo is kept.
    pub fn into_source(self) -> Result<LogoSource> {
        match (self.url, self.file, self.remove) {
            (Some(_), Some(_), _) => bail!("Use either --logo-url or --logo-file, not both"),
            (Some(_), _, true) | (_, Some(_), true) => {
                bail!("--remove-logo cannot be combined with a new logo")
            }
            (Some(url), None, false) => Ok(LogoSource::Url(url)),
            (None, Some(path), false) => Ok(LogoSource::Upload(ImageUpload::from_path(
                &path,
                self.content_type.as_deref(),
            )?)),
            (None, None, true) => Ok(LogoSource::Remove),
            (None, None, false) => Ok(LogoSource::Keep),
        }
    }
}

pub async fn add(catalog: &CatalogStore, name: &str, logo: LogoArgs) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Brand name cannot be empty");
    }
    let logo = match logo.into_source()? {
        LogoSource::Keep => LogoSource::Remove,
        other => other,
    };

    let brand = BrandManager::new(catalog)
        .add(name, logo)
        .await
        .context("Failed to save brand. Please try again.")?;

    println!(
        "{} {}",
        ui::style_text("Brand added successfully!", ui::StyleType::Success),
        ui::style_text(&brand.id, ui::StyleType::Subtle)
    );
    Ok(())
}

pub async fn edit(
    catalog: &CatalogStore,
    id: &str,
    name: Option<&str>,
    logo: LogoArgs,
) -> Result<()> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        bail!("Brand name cannot be empty");
    }
    let brand = BrandManager::new(catalog)
        .update(id, name, logo.into_source()?)
        .await
        .context("Failed to save brand. Please try again.")?;

    println!(
        "{} {}",
        ui::style_text("Brand updated successfully!", ui::StyleType::Success),
        ui::style_text(&brand.id, ui::StyleType::Subtle)
    );
    Ok(())
}

pub async fn remove(catalog: &CatalogStore, id: &str) -> Result<()> {
    let brand = BrandManager::new(catalog)
        .remove(id)
        .await
        .context("Failed to delete brand.")?;

    println!(
        "{} {}",
        ui::style_text("Brand deleted successfully!", ui::StyleType::Success),
        ui::style_text(&brand.name, ui::StyleType::Subtle)
    );
    Ok(())
}
