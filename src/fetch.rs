//! Time-bounded HTTP fetch primitive
//!
//! Backs both the instance metadata lookups and the generic RPC client.
//! Every request is bounded by a short fixed timeout; failures are never
//! retried here, the caller decides whether a miss is fatal.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;

/// Link-local instance metadata service
pub const METADATA_BASE_URL: &str = "http://169.254.169.254/latest/meta-data";

/// Fixed bound on any single fetch
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(2);

/// Source of instance metadata items.
///
/// The trait exists so the cache and the provider adapter can be exercised
/// against canned metadata in tests instead of the link-local service.
#[async_trait]
pub trait Metadata: Send + Sync {
    /// Fetch one metadata item, e.g. `placement/availability-zone`
    async fn item(&self, item: &str) -> std::result::Result<String, FetchError>;
}

/// Plain HTTP GET with the fixed timeout applied
pub struct UrlFetcher {
    http: reqwest::Client,
}

impl UrlFetcher {
    pub fn new() -> std::result::Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { http })
    }

    /// Fetch a URL, returning the response body as text.
    ///
    /// Any transport error or non-2xx status is an error; there is no retry.
    pub async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        log::info!("fetching {}", url);

        let response = self.http.get(url).send().await.map_err(|e| {
            let err = classify(url, e);
            log::error!("fetch failed: {}", err);
            err
        })?;

        let status = response.status();
        if !status.is_success() {
            let err = FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            };
            log::error!("fetch failed: {}", err);
            return Err(err);
        }

        let body = response.text().await.map_err(|e| {
            let err = classify(url, e);
            log::error!("fetch failed: {}", err);
            err
        })?;
        log::debug!("fetched {}", body);
        Ok(body)
    }
}

fn classify(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Instance metadata service client
pub struct MetadataClient {
    fetcher: UrlFetcher,
    base_url: String,
}

impl MetadataClient {
    /// Client against the link-local metadata address
    #[allow(dead_code)]
    pub fn new() -> std::result::Result<Self, FetchError> {
        Self::with_base_url(METADATA_BASE_URL.to_string())
    }

    /// Client against an explicit base URL (for tests and local stubs)
    pub fn with_base_url(base_url: String) -> std::result::Result<Self, FetchError> {
        Ok(Self {
            fetcher: UrlFetcher::new()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Metadata for MetadataClient {
    async fn item(&self, item: &str) -> std::result::Result<String, FetchError> {
        self.fetcher
            .fetch(&format!("{}/{}", self.base_url, item))
            .await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/latest/meta-data/instance-id")
            .with_status(200)
            .with_body("i-0abc123")
            .create_async()
            .await;

        let fetcher = UrlFetcher::new().unwrap();
        let url = format!("{}/latest/meta-data/instance-id", server.url());
        let body = fetcher.fetch(&url).await.unwrap();
        assert_eq!(body, "i-0abc123");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/latest/meta-data/missing")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = UrlFetcher::new().unwrap();
        let url = format!("{}/latest/meta-data/missing", server.url());
        let err = fetcher.fetch(&url).await.unwrap_err();
        match err {
            FetchError::Status { status, .. } => assert_eq!(status, 404),
            other => panic!("expected FetchError::Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        let fetcher = UrlFetcher::new().unwrap();
        // Reserved port on localhost that nothing listens on
        let err = fetcher.fetch("http://127.0.0.1:1/nope").await.unwrap_err();
        match err {
            FetchError::Transport { .. } | FetchError::Timeout { .. } => (),
            other => panic!("expected transport failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_metadata_client_joins_item_path() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/latest/meta-data/placement/availability-zone")
            .with_status(200)
            .with_body("us-east-1a")
            .create_async()
            .await;

        let base = format!("{}/latest/meta-data/", server.url());
        let client = MetadataClient::with_base_url(base).unwrap();
        let zone = client.item("placement/availability-zone").await.unwrap();
        assert_eq!(zone, "us-east-1a");
    }
}
