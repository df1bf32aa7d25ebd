//! Port for downloading raw image bytes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::ImageError;

/// Port for fetching the bytes behind an image locator.
/// The content type is implied by the bytes and never checked.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Downloads the resource at `url`.
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, ImageError>;
}
