use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use storefront::blob::HttpBlobTransport;
use storefront::catalog::{BrandManager, CatalogSettings, CatalogStore, LogoSource};
use storefront::core::credential::StaticToken;
use storefront::core::endpoint::BlobEndpoint;
use storefront::core::{Brand, CatalogRecord, Category, Collection, StoreError};
use storefront::store::KeyValueStore;
use storefront::{AppCommand, run_command};
use tempfile::TempDir;
use tracing::info;
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils {
    use super::*;

    /// Config file pointing at `server`, with writes going out anonymously.
    pub fn write_config(dir: &Path, server: &MockServer) -> String {
        let config = format!(
            r#"
storage:
  account_name: "teststore"
  endpoint: "{}"
  read_retries: 0
cache:
  ttl_secs: 60
auth:
  token_env: null
data_path: "{}"
"#,
            server.uri(),
            dir.join("data").display()
        );
        let config_path = dir.join("config.yaml");
        fs::write(&config_path, config).unwrap();
        config_path.to_string_lossy().to_string()
    }

    pub fn catalog_for(server: &MockServer, token: Option<&str>) -> CatalogStore {
        let settings = CatalogSettings {
            endpoint: BlobEndpoint::parse(&server.uri()).unwrap(),
            data_container: "product-data".to_string(),
            images_container: "product-images".to_string(),
            read_credential: None,
            ttl: Duration::from_secs(60),
        };
        let credentials = match token {
            Some(token) => StaticToken::new(token),
            None => StaticToken::anonymous(),
        };
        CatalogStore::new(
            settings,
            Arc::new(HttpBlobTransport::new("2021-08-06", 0).unwrap()),
            Arc::new(credentials),
            &KeyValueStore::in_memory(),
        )
    }
}

#[test_log::test(tokio::test)]
async fn test_empty_store_serves_default_categories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let catalog = test_utils::catalog_for(&server, None);

    let categories = catalog.fetch_categories().await;
    info!(?categories, "Fetched categories from empty store");
    assert_eq!(categories, Category::defaults());
    assert_eq!(categories.len(), 5);
    assert!(catalog.fetch_brands().await.is_empty());
    assert!(catalog.fetch_products().await.is_empty());

    // Defaults are cached, so a second read stays local.
    let requests_before = server.received_requests().await.unwrap().len();
    assert_eq!(catalog.fetch_categories().await.len(), 5);
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        requests_before
    );
}

#[test_log::test(tokio::test)]
async fn test_saved_brands_are_read_back_after_cache_clear() {
    let server = MockServer::start().await;
    let brand = Brand {
        id: "brand_1".to_string(),
        name: "Acme".to_string(),
        logo_url: None,
    };
    let expected = serde_json::json!([{"id": "brand_1", "name": "Acme", "logoUrl": null}]);

    Mock::given(method("PUT"))
        .and(path("/product-data/brands.json"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("x-ms-blob-type", "BlockBlob"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/product-data/brands.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&expected))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = test_utils::catalog_for(&server, Some("secret-token"));
    catalog.save_brands(std::slice::from_ref(&brand)).await.unwrap();
    catalog.clear_cache(Some(Collection::Brands)).await;

    let brands = catalog.fetch_brands().await;
    assert_eq!(brands, vec![brand]);
}

#[test_log::test(tokio::test)]
async fn test_rejected_save_leaves_no_local_copy() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let catalog = test_utils::catalog_for(&server, None);
    let err = catalog
        .save_categories(&[Category::new("cat_9", "Garden")])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::WriteRejected { status, .. } if status.as_u16() == 403
    ));

    // The mirror was rolled back, so the failing read ends at the defaults.
    assert_eq!(catalog.fetch_categories().await, Category::defaults());
}

#[test_log::test(tokio::test)]
async fn test_brand_logo_replacement_deletes_old_blob() {
    let server = MockServer::start().await;
    let old_logo = format!("{}/product-images/1700000000000_old.png", server.uri());
    let existing = serde_json::json!([
        {"id": "brand_1", "name": "Acme", "logoUrl": old_logo}
    ]);

    Mock::given(method("GET"))
        .and(path("/product-data/brands.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&existing))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/product-data/brands.json"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/product-images/1700000000000_old.png"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = test_utils::catalog_for(&server, Some("secret-token"));
    let brand = BrandManager::new(&catalog)
        .update(
            "brand_1",
            None,
            LogoSource::Url("https://cdn.example.com/acme.png".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(brand.name, "Acme");
    assert_eq!(
        brand.logo_url.as_deref(),
        Some("https://cdn.example.com/acme.png")
    );
}

#[test_log::test(tokio::test)]
async fn test_run_command_lists_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product-data/categories.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"id": "cat_1", "name": "Books"}])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/product-data/brands.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/product-data/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(dir.path(), &server);

    let result = run_command(AppCommand::Catalog, Some(&config_path)).await;
    assert!(result.is_ok(), "catalog command failed: {result:?}");
}

#[test_log::test(tokio::test)]
async fn test_run_command_saves_categories_from_file() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/product-data/categories.json"))
        .and(body_json(serde_json::json!([{"id": "cat_1", "name": "Books"}])))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(dir.path(), &server);
    let file = dir.path().join("categories.json");
    fs::write(&file, r#"[{"id": "cat_1", "name": "Books"}]"#).unwrap();

    run_command(AppCommand::SaveCategories(file), Some(&config_path))
        .await
        .unwrap();
}

#[test_log::test(tokio::test)]
async fn test_run_command_reports_rejected_save() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(dir.path(), &server);
    let file = dir.path().join("products.json");
    fs::write(&file, r#"[{"id": "prod_1", "name": "Lamp", "price": 12.5}]"#).unwrap();

    let err = run_command(AppCommand::SaveProducts(file), Some(&config_path))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to save products"));
}

#[test_log::test(tokio::test)]
async fn test_run_command_uploads_image() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/product-images/\d+_logo\.png$"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(dir.path(), &server);
    let image = dir.path().join("logo.png");
    fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    run_command(
        AppCommand::UploadImage {
            path: image,
            content_type: None,
        },
        Some(&config_path),
    )
    .await
    .unwrap();
}

#[test_log::test(tokio::test)]
async fn test_run_command_with_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.yaml");

    let err = run_command(AppCommand::ListCategories, missing.to_str())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
