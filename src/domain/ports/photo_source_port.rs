//! Port for fetching pages of photo records.

use async_trait::async_trait;

use crate::domain::entities::PhotoRecord;
use crate::domain::errors::FeedError;

/// Port for the remote photo listing.
#[async_trait]
pub trait PhotoSourcePort: Send + Sync {
    /// Fetches one page of records, in server order.
    ///
    /// `page` is 1-based; `limit` is the page size.
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<PhotoRecord>, FeedError>;
}
