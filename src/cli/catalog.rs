use super::ui;
use crate::catalog::CatalogStore;
use crate::core::model::{Brand, CatalogRecord, Category, Product};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::path::Path;

pub fn categories_table(categories: &[Category]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("ID"), ui::header_cell("Name")]);
    for category in categories {
        table.add_row(vec![Cell::new(&category.id), Cell::new(&category.name)]);
    }
    table.to_string()
}

pub fn brands_table(catalog: &CatalogStore, brands: &[Brand]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Name"),
        ui::header_cell("Logo"),
    ]);
    for brand in brands {
        let logo = brand
            .logo_url
            .as_deref()
            .map(|url| catalog.resolve_image_url(url));
        table.add_row(vec![
            Cell::new(&brand.id),
            Cell::new(&brand.name),
            ui::optional_cell(logo.as_deref()),
        ]);
    }
    table.to_string()
}

pub fn products_table(products: &[Product]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Name"),
        ui::header_cell("Fields"),
    ]);
    for product in products {
        let fields = product.0.as_object().map_or(0, |o| o.len());
        table.add_row(vec![
            ui::optional_cell(product.id()),
            ui::optional_cell(product.name()),
            Cell::new(fields),
        ]);
    }
    table.to_string()
}

fn print_section(title: &str, count: usize, table: String) {
    println!(
        "{} {}\n",
        ui::style_text(title, ui::StyleType::Title),
        ui::style_text(&format!("({count})"), ui::StyleType::Subtle)
    );
    if count == 0 {
        println!("{}", ui::style_text("Nothing here yet.", ui::StyleType::Subtle));
    } else {
        println!("{table}");
    }
}

pub async fn list_categories(catalog: &CatalogStore) -> Result<()> {
    let pb = ui::new_spinner("Fetching categories...");
    let categories = catalog.fetch_categories().await;
    pb.finish_and_clear();

    print_section("Categories", categories.len(), categories_table(&categories));
    Ok(())
}

pub async fn list_brands(catalog: &CatalogStore) -> Result<()> {
    let pb = ui::new_spinner("Fetching brands...");
    let brands = catalog.fetch_brands().await;
    pb.finish_and_clear();

    print_section("Brands", brands.len(), brands_table(catalog, &brands));
    Ok(())
}

pub async fn list_products(catalog: &CatalogStore) -> Result<()> {
    let pb = ui::new_spinner("Fetching products...");
    let products = catalog.fetch_products().await;
    pb.finish_and_clear();

    print_section("Products", products.len(), products_table(&products));
    Ok(())
}

/// Fetches all three collections at once and prints them.
pub async fn overview(catalog: &CatalogStore) -> Result<()> {
    let pb = ui::new_spinner("Fetching catalog...");
    let (categories, brands, products) = futures::join!(
        catalog.fetch_categories(),
        catalog.fetch_brands(),
        catalog.fetch_products()
    );
    pb.finish_and_clear();

    print_section("Categories", categories.len(), categories_table(&categories));
    ui::print_separator();
    print_section("Brands", brands.len(), brands_table(catalog, &brands));
    ui::print_separator();
    print_section("Products", products.len(), products_table(&products));
    Ok(())
}

pub fn read_collection_file<T: CatalogRecord>(path: &Path) -> Result<Vec<T>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| {
        format!(
            "Failed to parse {} as a list of {}",
            path.display(),
            T::COLLECTION
        )
    })
}

/// Replaces the remote collection with the JSON array in `path`.
pub async fn save_from_file<T: CatalogRecord>(catalog: &CatalogStore, path: &Path) -> Result<()> {
    let items: Vec<T> = read_collection_file(path)?;

    let pb = ui::new_spinner(&format!("Saving {}...", T::COLLECTION));
    let result = catalog.save(&items).await;
    pb.finish_and_clear();

    result.with_context(|| format!("Failed to save {}. Please try again.", T::COLLECTION))?;
    println!(
        "{}",
        ui::style_text(
            &format!("Saved {} {}", items.len(), T::COLLECTION),
            ui::StyleType::Success
        )
    );
    Ok(())
}
