pub mod blob;
pub mod catalog;
pub mod cli;
pub mod core;
pub mod store;

use crate::catalog::CatalogStore;
use crate::core::config::AppConfig;
use crate::core::model::{Category, Collection, Product};
use crate::store::KeyValueStore;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

/// Logo options as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct LogoArgs {
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    pub content_type: Option<String>,
    pub remove: bool,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Catalog,
    ListCategories,
    SaveCategories(PathBuf),
    ListBrands,
    AddBrand {
        name: String,
        logo: LogoArgs,
    },
    EditBrand {
        id: String,
        name: Option<String>,
        logo: LogoArgs,
    },
    RemoveBrand(String),
    ListProducts,
    SaveProducts(PathBuf),
    UploadImage {
        path: PathBuf,
        content_type: Option<String>,
    },
    DeleteImage(String),
    ImageUrl(String),
    ClearCache(Option<Collection>),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Storefront catalog starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = KeyValueStore::new(&config);
    let catalog = CatalogStore::from_config(&config, &store)?;

    match command {
        AppCommand::Catalog => cli::catalog::overview(&catalog).await,
        AppCommand::ListCategories => cli::catalog::list_categories(&catalog).await,
        AppCommand::SaveCategories(path) => {
            cli::catalog::save_from_file::<Category>(&catalog, &path).await
        }
        AppCommand::ListBrands => cli::catalog::list_brands(&catalog).await,
        AppCommand::AddBrand { name, logo } => cli::brands::add(&catalog, &name, logo).await,
        AppCommand::EditBrand { id, name, logo } => {
            cli::brands::edit(&catalog, &id, name.as_deref(), logo).await
        }
        AppCommand::RemoveBrand(id) => cli::brands::remove(&catalog, &id).await,
        AppCommand::ListProducts => cli::catalog::list_products(&catalog).await,
        AppCommand::SaveProducts(path) => {
            cli::catalog::save_from_file::<Product>(&catalog, &path).await
        }
        AppCommand::UploadImage { path, content_type } => {
            cli::images::upload(&catalog, &path, content_type.as_deref()).await
        }
        AppCommand::DeleteImage(url) => cli::images::delete(&catalog, &url).await,
        AppCommand::ImageUrl(url) => {
            cli::images::resolve(&catalog, &url);
            Ok(())
        }
        AppCommand::ClearCache(collection) => {
            catalog.clear_cache(collection).await;
            println!(
                "Cleared cache for {}",
                collection.map_or("all collections".to_string(), |c| c.to_string())
            );
            Ok(())
        }
    }
}
