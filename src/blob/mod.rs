//! HTTP access to the blob object store.

pub mod http;
pub mod util;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};

pub use http::HttpBlobTransport;

/// Status and body of a blob request. Error statuses are data here; the
/// catalog decides what they mean.
#[derive(Debug, Clone)]
pub struct BlobResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl BlobResponse {
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }
}

/// Raw GET/PUT/DELETE against blob URLs. `Err` is reserved for requests that
/// produced no response at all.
#[async_trait]
pub trait BlobTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<BlobResponse>;

    async fn put(
        &self,
        url: &Url,
        body: Vec<u8>,
        content_type: &str,
        token: Option<&str>,
    ) -> Result<BlobResponse>;

    async fn delete(&self, url: &Url, token: Option<&str>) -> Result<BlobResponse>;
}
