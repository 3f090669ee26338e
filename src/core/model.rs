//! Catalog records and the collections they are persisted in.

use rand::Rng;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Categories,
    Brands,
    Products,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Categories => "categories",
            Collection::Brands => "brands",
            Collection::Products => "products",
        }
    }

    pub fn blob_name(&self) -> String {
        format!("{}.json", self.name())
    }

    /// Key of the TTL-wrapped cache entry.
    pub fn cache_key(&self) -> &'static str {
        match self {
            Collection::Categories => "categories_cache",
            Collection::Brands => "brands_cache",
            Collection::Products => "products_cache",
        }
    }

    /// Key of the plain mirror kept as an offline fallback.
    pub fn mirror_key(&self) -> &'static str {
        match self {
            Collection::Categories => "categories",
            Collection::Brands => "brands",
            Collection::Products => "products_cache",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "categories" => Ok(Collection::Categories),
            "brands" => Ok(Collection::Brands),
            "products" => Ok(Collection::Products),
            _ => Err(anyhow::anyhow!("Unknown collection: {}", s)),
        }
    }
}

/// A record type stored as one JSON array blob.
pub trait CatalogRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Served when the collection blob does not exist yet.
    fn defaults() -> Vec<Self> {
        Vec::new()
    }

    /// Whether an empty remote collection is replaced by the defaults.
    fn defaults_when_empty() -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl CatalogRecord for Category {
    const COLLECTION: Collection = Collection::Categories;

    fn defaults() -> Vec<Self> {
        vec![
            Category::new("cat_1", "Electronics"),
            Category::new("cat_2", "Clothing"),
            Category::new("cat_3", "Home & Kitchen"),
            Category::new("cat_4", "Sports & Outdoors"),
            Category::new("cat_5", "Toys & Games"),
        ]
    }

    fn defaults_when_empty() -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl CatalogRecord for Brand {
    const COLLECTION: Collection = Collection::Brands;
}

/// Product records are opaque to the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(pub Value);

impl Product {
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }
}

impl CatalogRecord for Product {
    const COLLECTION: Collection = Collection::Products;
}

/// Builds `<prefix>_<epoch millis>_<9 base36 chars>`.
pub fn generate_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .filter_map(|_| std::char::from_digit(rng.gen_range(0..36), 36))
        .collect();
    format!(
        "{}_{}_{}",
        prefix,
        chrono::Utc::now().timestamp_millis(),
        suffix
    )
}
