use super::util::{redacted, with_retry};
use super::{BlobResponse, BlobTransport};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Url};
use tracing::{debug, instrument};

const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";
const VERSION_HEADER: &str = "x-ms-version";

pub struct HttpBlobTransport {
    client: Client,
    api_version: String,
    read_retries: usize,
}

impl HttpBlobTransport {
    pub fn new(api_version: &str, read_retries: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("storefront/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_version: api_version.to_string(),
            read_retries,
        })
    }

    fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_response(response: reqwest::Response, url: &Url) -> Result<BlobResponse> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", redacted(url)))?;
        debug!(%status, bytes = body.len(), "Received blob response");
        Ok(BlobResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl BlobTransport for HttpBlobTransport {
    #[instrument(name = "BlobGet", skip_all, fields(url = %redacted(url)))]
    async fn get(&self, url: &Url) -> Result<BlobResponse> {
        let response = with_retry(
            || async { self.client.get(url.clone()).send().await },
            self.read_retries,
            500,
        )
        .await
        .with_context(|| format!("GET {} failed", redacted(url)))?;
        Self::read_response(response, url).await
    }

    #[instrument(name = "BlobPut", skip_all, fields(url = %redacted(url), content_type = %content_type))]
    async fn put(
        &self,
        url: &Url,
        body: Vec<u8>,
        content_type: &str,
        token: Option<&str>,
    ) -> Result<BlobResponse> {
        let request = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, content_type)
            .header(BLOB_TYPE_HEADER, "BlockBlob")
            .header(VERSION_HEADER, &self.api_version)
            .body(body);
        let response = Self::authorize(request, token)
            .send()
            .await
            .with_context(|| format!("PUT {} failed", redacted(url)))?;
        Self::read_response(response, url).await
    }

    #[instrument(name = "BlobDelete", skip_all, fields(url = %redacted(url)))]
    async fn delete(&self, url: &Url, token: Option<&str>) -> Result<BlobResponse> {
        let request = self
            .client
            .delete(url.clone())
            .header(VERSION_HEADER, &self.api_version);
        let response = Self::authorize(request, token)
            .send()
            .await
            .with_context(|| format!("DELETE {} failed", redacted(url)))?;
        Self::read_response(response, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_put_sends_blob_headers() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/product-data/brands.json"))
            .and(header("x-ms-blob-type", "BlockBlob"))
            .and(header("x-ms-version", "2021-08-06"))
            .and(header("content-type", "application/json"))
            .and(header("authorization", "Bearer token-1"))
            .and(body_string("[]"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = HttpBlobTransport::new("2021-08-06", 0).unwrap();
        let url = Url::parse(&format!("{}/product-data/brands.json", mock_server.uri())).unwrap();
        let response = transport
            .put(&url, b"[]".to_vec(), "application/json", Some("token-1"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_error_status_is_a_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/product-data/products.json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("BlobNotFound"))
            .mount(&mock_server)
            .await;

        let transport = HttpBlobTransport::new("2021-08-06", 0).unwrap();
        let url =
            Url::parse(&format!("{}/product-data/products.json", mock_server.uri())).unwrap();
        let response = transport.get(&url).await.unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, b"BlobNotFound");
    }

    #[tokio::test]
    async fn test_delete_without_token_is_anonymous() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/product-images/a.png"))
            .and(header("x-ms-version", "2021-08-06"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = HttpBlobTransport::new("2021-08-06", 0).unwrap();
        let url = Url::parse(&format!("{}/product-images/a.png", mock_server.uri())).unwrap();
        let response = transport.delete(&url, None).await.unwrap();

        assert_eq!(response.status, StatusCode::ACCEPTED);
        let requests = mock_server.received_requests().await.unwrap();
        assert!(!requests[0].headers.contains_key("authorization"));
    }
}
