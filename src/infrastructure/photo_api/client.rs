//! Photo API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, warn};

use super::dto::PhotoDto;
use crate::domain::entities::PhotoRecord;
use crate::domain::errors::{FeedError, ImageError};
use crate::domain::ports::{ImageFetchPort, PhotoSourcePort};

/// Default photo API base URL.
pub const DEFAULT_API_BASE: &str = "https://jsonplaceholder.typicode.com";
const USER_AGENT: &str = concat!("photogrid/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the photo listing and the image resources it points at.
pub struct PhotoApiClient {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for PhotoApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PhotoApiClient {
    /// Creates new client with default base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new() -> Result<Self, FeedError> {
        Self::with_base_url(DEFAULT_API_BASE, DEFAULT_TIMEOUT)
    }

    /// Creates client with custom base URL and request timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::unexpected(format!("failed to create HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn photos_url(&self) -> String {
        format!("{}/photos", self.base_url)
    }
}

fn describe_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "failed to connect".to_string()
    } else {
        e.to_string()
    }
}

#[async_trait]
impl PhotoSourcePort for PhotoApiClient {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<PhotoRecord>, FeedError> {
        debug!(page, limit, "Fetching photo page");

        let response = self
            .client
            .get(self.photos_url())
            .query(&[("_page", page), ("_limit", limit)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to reach photo API");
                FeedError::network(describe_request_error(&e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, page, "Photo API returned an error status");
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::network(format!("failed to read body: {e}")))?;

        let photos: Vec<PhotoDto> = serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, page, "Failed to parse photo page");
            FeedError::decode(e.to_string())
        })?;

        debug!(page, count = photos.len(), "Photo page fetched");

        Ok(photos.into_iter().map(PhotoRecord::from).collect())
    }
}

#[async_trait]
impl ImageFetchPort for PhotoApiClient {
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, ImageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageError::network(describe_request_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status {
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| ImageError::network(format!("failed to read body: {e}")))
    }
}
