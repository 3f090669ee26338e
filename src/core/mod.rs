//! Core types shared by the catalog, the local store and the CLI

pub mod cache;
pub mod config;
pub mod credential;
pub mod endpoint;
pub mod error;
pub mod log;
pub mod model;

// Re-export main types for cleaner imports
pub use credential::AccessTokenProvider;
pub use error::StoreError;
pub use model::{Brand, CatalogRecord, Category, Collection, Product};
