//! Paged photo feed state and its single in-flight page request.
//!
//! The controller is owned by one task and mutated only through `&mut self`.
//! Page fetches run as spawned tasks that report back over a channel; the owner
//! applies those completions with [`PhotoFeedController::next_completion`] or
//! [`PhotoFeedController::drain_completions`], so feed state is never touched
//! from the fetch task itself.

use std::borrow::Cow;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::title_filter::filter_by_title;
use crate::domain::entities::PhotoRecord;
use crate::domain::errors::FeedError;
use crate::domain::ports::PhotoSourcePort;

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Observable view of the feed, republished after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    /// Loaded records, in arrival order.
    pub items: Arc<[PhotoRecord]>,
    /// Loaded records matching `search_query`, in arrival order.
    pub filtered: Arc<[PhotoRecord]>,
    /// Page the next load will request.
    pub current_page: u32,
    /// Whether a page request is in flight.
    pub is_loading: bool,
    /// Active title filter.
    pub search_query: String,
    /// Most recent page failure, cleared by the next successful page.
    pub last_error: Option<FeedError>,
}

/// Result of one page fetch, tagged with the feed generation it was issued in.
#[derive(Debug)]
pub struct PageCompletion {
    generation: u64,
    page: u32,
    result: Result<Vec<PhotoRecord>, FeedError>,
}

/// What applying a completion did to the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Records were appended and the page counter advanced.
    Appended {
        /// Page that was loaded.
        page: u32,
        /// Number of records appended.
        count: usize,
    },
    /// The page failed; nothing was appended and the same page will be retried.
    Failed(FeedError),
    /// The completion predates a reset and was dropped.
    Stale,
}

/// Owns the paged photo list, the loading flag, and the search query.
pub struct PhotoFeedController {
    source: Arc<dyn PhotoSourcePort>,
    page_size: u32,
    items: Vec<PhotoRecord>,
    current_page: u32,
    is_loading: bool,
    search_query: String,
    last_error: Option<FeedError>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    completion_tx: mpsc::UnboundedSender<PageCompletion>,
    completion_rx: mpsc::UnboundedReceiver<PageCompletion>,
    snapshot_tx: watch::Sender<FeedSnapshot>,
}

impl std::fmt::Debug for PhotoFeedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoFeedController")
            .field("page_size", &self.page_size)
            .field("items", &self.items.len())
            .field("current_page", &self.current_page)
            .field("is_loading", &self.is_loading)
            .field("search_query", &self.search_query)
            .finish_non_exhaustive()
    }
}

impl PhotoFeedController {
    /// Creates an empty feed. No request is issued until a load is triggered.
    #[must_use]
    pub fn new(source: Arc<dyn PhotoSourcePort>, page_size: u32) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let page_size = page_size.max(1);
        let (snapshot_tx, _) = watch::channel(FeedSnapshot {
            current_page: 1,
            ..FeedSnapshot::default()
        });

        Self {
            source,
            page_size,
            items: Vec::new(),
            current_page: 1,
            is_loading: false,
            search_query: String::new(),
            last_error: None,
            generation: 0,
            in_flight: None,
            completion_tx,
            completion_rx,
            snapshot_tx,
        }
    }

    /// Creates a feed with [`DEFAULT_PAGE_SIZE`].
    #[must_use]
    pub fn with_default_page_size(source: Arc<dyn PhotoSourcePort>) -> Self {
        Self::new(source, DEFAULT_PAGE_SIZE)
    }

    /// Requests the next page.
    ///
    /// Returns `false` without doing anything if a page is already in flight;
    /// requests are rejected, never queued. Must be called within a tokio runtime.
    pub fn load_next_page(&mut self) -> bool {
        if self.is_loading {
            debug!(
                page = self.current_page,
                "Page load already in flight, ignoring request"
            );
            return false;
        }

        let page = self.current_page;
        let limit = self.page_size;
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let completion_tx = self.completion_tx.clone();

        debug!(page, limit, "Requesting photo page");

        self.is_loading = true;
        self.in_flight = Some(tokio::spawn(async move {
            let result = source.fetch_page(page, limit).await;
            let _ = completion_tx.send(PageCompletion {
                generation,
                page,
                result,
            });
        }));

        self.publish();
        true
    }

    /// Empties the feed, rewinds to page 1 and requests it.
    ///
    /// A page still in flight is aborted; if it already completed, its result is
    /// dropped as stale when applied.
    pub fn reset(&mut self) -> bool {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }

        self.generation = self.generation.wrapping_add(1);
        self.is_loading = false;
        self.items.clear();
        self.last_error = None;
        self.current_page = 1;

        info!(generation = self.generation, "Feed reset");

        self.load_next_page()
    }

    /// Infinite-scroll trigger: loads the next page when `record` is the last loaded record.
    ///
    /// Records are compared by every field, so an earlier duplicate of the last id
    /// does not count.
    pub fn item_appeared(&mut self, record: &PhotoRecord) -> bool {
        if self.items.last() == Some(record) {
            self.load_next_page()
        } else {
            false
        }
    }

    /// Waits for the in-flight page and applies it.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<PageOutcome> {
        while self.is_loading {
            let completion = self.completion_rx.recv().await?;
            match self.apply(completion) {
                PageOutcome::Stale => {}
                outcome => return Some(outcome),
            }
        }
        None
    }

    /// Applies every completion that has already arrived, without waiting.
    pub fn drain_completions(&mut self) -> Vec<PageOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.completion_rx.try_recv() {
            match self.apply(completion) {
                PageOutcome::Stale => {}
                outcome => outcomes.push(outcome),
            }
        }
        outcomes
    }

    /// Applies one page completion to the feed.
    pub fn apply(&mut self, completion: PageCompletion) -> PageOutcome {
        let PageCompletion {
            generation,
            page,
            result,
        } = completion;

        if generation != self.generation {
            debug!(page, generation, "Dropping page completion from before reset");
            return PageOutcome::Stale;
        }

        self.is_loading = false;
        self.in_flight = None;

        let outcome = match result {
            Ok(records) => {
                let count = records.len();
                self.items.extend(records);
                self.current_page += 1;
                self.last_error = None;
                info!(page, count, total = self.items.len(), "Photo page loaded");
                PageOutcome::Appended { page, count }
            }
            Err(error) => {
                warn!(page, error = %error, "Photo page failed to load");
                self.last_error = Some(error.clone());
                PageOutcome::Failed(error)
            }
        };

        self.publish();
        outcome
    }

    /// Sets the title filter.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.publish();
    }

    /// Returns the title filter.
    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Returns loaded records, in arrival order.
    #[must_use]
    pub fn items(&self) -> &[PhotoRecord] {
        &self.items
    }

    /// Returns the loaded records matching the search query.
    #[must_use]
    pub fn filtered_items(&self) -> Cow<'_, [PhotoRecord]> {
        filter_by_title(&self.items, &self.search_query)
    }

    /// Returns the page the next load will request.
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Returns the configured page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns whether a page request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Returns the most recent page failure.
    #[must_use]
    pub const fn last_error(&self) -> Option<&FeedError> {
        self.last_error.as_ref()
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            items: Arc::from(self.items.as_slice()),
            filtered: Arc::from(self.filtered_items().as_ref()),
            current_page: self.current_page,
            is_loading: self.is_loading,
            search_query: self.search_query.clone(),
            last_error: self.last_error.clone(),
        }
    }

    /// Subscribes to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot_tx.subscribe()
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

impl Drop for PhotoFeedController {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PhotoId;
    use crate::domain::ports::mocks::{MockPhotoSource, make_page};

    fn controller(source: &Arc<MockPhotoSource>) -> PhotoFeedController {
        PhotoFeedController::with_default_page_size(source.clone())
    }

    fn titled(titles: &[&str]) -> Vec<PhotoRecord> {
        titles
            .iter()
            .zip(1i64..)
            .map(|(title, id)| PhotoRecord::new(id, *title, format!("https://example.com/{id}")))
            .collect()
    }

    #[tokio::test]
    async fn test_first_page_fills_feed() {
        let source = Arc::new(MockPhotoSource::new());
        source.push_page(make_page(1, 30));
        let mut feed = controller(&source);

        assert!(feed.reset());
        let outcome = feed.next_completion().await;

        assert_eq!(outcome, Some(PageOutcome::Appended { page: 1, count: 30 }));
        assert_eq!(feed.items().len(), 30);
        assert_eq!(feed.items()[0].id(), PhotoId(1));
        assert_eq!(feed.items()[29].id(), PhotoId(30));
        assert_eq!(feed.current_page(), 2);
        assert!(!feed.is_loading());
        assert_eq!(source.calls(), vec![(1, 30)]);
    }

    #[tokio::test]
    async fn test_item_count_tracks_page_sizes() {
        let source = Arc::new(MockPhotoSource::new());
        source.push_page(make_page(1, 30));
        source.push_page(make_page(31, 30));
        source.push_page(make_page(61, 12));
        let mut feed = controller(&source);

        let mut expected_len = 0;
        for (expected_page, size) in [(2, 30), (3, 30), (4, 12)] {
            assert!(feed.load_next_page());
            feed.next_completion().await;
            expected_len += size;
            assert_eq!(feed.items().len(), expected_len);
            assert_eq!(feed.current_page(), expected_page);
        }

        assert_eq!(source.calls(), vec![(1, 30), (2, 30), (3, 30)]);
    }

    #[tokio::test]
    async fn test_failed_page_keeps_items_and_clears_loading() {
        let source = Arc::new(MockPhotoSource::new());
        source.push_page(make_page(1, 30));
        source.push_error(FeedError::decode("expected a sequence"));
        let mut feed = controller(&source);

        feed.load_next_page();
        feed.next_completion().await;
        feed.load_next_page();
        let outcome = feed.next_completion().await;

        assert!(matches!(outcome, Some(PageOutcome::Failed(FeedError::Decode { .. }))));
        assert_eq!(feed.items().len(), 30);
        assert!(!feed.is_loading());
        assert_eq!(feed.current_page(), 2);
        assert!(matches!(feed.last_error(), Some(FeedError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_failed_page_is_retried_and_error_cleared() {
        let source = Arc::new(MockPhotoSource::new());
        source.push_error(FeedError::network("connection refused"));
        source.push_page(make_page(1, 5));
        let mut feed = controller(&source);

        feed.load_next_page();
        feed.next_completion().await;
        assert!(feed.last_error().is_some());

        feed.load_next_page();
        feed.next_completion().await;

        assert_eq!(source.calls(), vec![(1, 30), (1, 30)]);
        assert_eq!(feed.items().len(), 5);
        assert!(feed.last_error().is_none());
    }

    #[tokio::test]
    async fn test_pending_load_rejects_second_request() {
        let (source, gate) = MockPhotoSource::gated();
        let source = Arc::new(source);
        source.push_page(make_page(1, 30));
        let mut feed = controller(&source);

        assert!(feed.load_next_page());
        assert!(!feed.load_next_page());
        tokio::task::yield_now().await;
        assert!(feed.is_loading());
        assert_eq!(source.calls().len(), 1);

        gate.add_permits(1);
        feed.next_completion().await;

        assert_eq!(source.calls(), vec![(1, 30)]);
        assert_eq!(feed.items().len(), 30);
    }

    #[tokio::test]
    async fn test_reset_clears_before_reload() {
        let source = Arc::new(MockPhotoSource::new());
        source.push_page(make_page(1, 30));
        source.push_page(make_page(31, 30));
        source.push_page(make_page(1, 30));
        let mut feed = controller(&source);

        for _ in 0..2 {
            feed.load_next_page();
            feed.next_completion().await;
        }
        assert_eq!(feed.items().len(), 60);

        assert!(feed.reset());
        assert!(feed.items().is_empty());
        assert_eq!(feed.current_page(), 1);
        assert!(feed.is_loading());

        feed.next_completion().await;
        assert_eq!(feed.items().len(), 30);
        assert_eq!(feed.current_page(), 2);
        assert_eq!(source.calls().last(), Some(&(1, 30)));
    }

    #[tokio::test]
    async fn test_reset_clears_last_error() {
        let (source, gate) = MockPhotoSource::gated();
        let source = Arc::new(source);
        source.push_error(FeedError::network("connection refused"));
        source.push_page(make_page(1, 5));
        let mut feed = controller(&source);
        let snapshots = feed.subscribe();

        feed.load_next_page();
        gate.add_permits(1);
        feed.next_completion().await;
        assert!(feed.last_error().is_some());

        assert!(feed.reset());
        assert!(feed.is_loading());
        assert_eq!(feed.last_error(), None);
        assert_eq!(snapshots.borrow().last_error, None);
        assert!(snapshots.borrow().items.is_empty());

        gate.add_permits(1);
        feed.next_completion().await;
        assert_eq!(feed.items().len(), 5);
    }

    #[tokio::test]
    async fn test_reset_supersedes_pending_load() {
        let (source, gate) = MockPhotoSource::gated();
        let source = Arc::new(source);
        source.push_page(make_page(1, 30));
        let mut feed = controller(&source);

        feed.load_next_page();
        tokio::task::yield_now().await;
        assert!(feed.reset());
        tokio::task::yield_now().await;

        gate.add_permits(2);
        let outcome = feed.next_completion().await;

        assert_eq!(outcome, Some(PageOutcome::Appended { page: 1, count: 30 }));
        assert_eq!(source.calls(), vec![(1, 30), (1, 30)]);
        assert_eq!(feed.items().len(), 30);
        assert!(!feed.is_loading());
        assert!(feed.drain_completions().is_empty());
    }

    #[tokio::test]
    async fn test_stale_completion_is_dropped() {
        let source = Arc::new(MockPhotoSource::new());
        let mut feed = controller(&source);
        feed.reset();
        feed.next_completion().await;

        let stale = PageCompletion {
            generation: 0,
            page: 4,
            result: Ok(make_page(90, 3)),
        };

        assert_eq!(feed.apply(stale), PageOutcome::Stale);
        assert!(feed.items().is_empty());
        assert_eq!(feed.current_page(), 2);
    }

    #[tokio::test]
    async fn test_next_completion_without_load_returns_none() {
        let source = Arc::new(MockPhotoSource::new());
        let mut feed = controller(&source);

        assert_eq!(feed.next_completion().await, None);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_drain_completions_applies_arrived_pages() {
        let source = Arc::new(MockPhotoSource::new());
        source.push_page(make_page(1, 3));
        let mut feed = controller(&source);

        feed.load_next_page();
        while feed.is_loading() {
            tokio::task::yield_now().await;
            feed.drain_completions();
        }

        assert_eq!(feed.items().len(), 3);
    }

    #[tokio::test]
    async fn test_filtered_items_follow_search_query() {
        let source = Arc::new(MockPhotoSource::new());
        source.push_page(titled(&["abcde", "xyz", "zabc"]));
        let mut feed = controller(&source);
        feed.load_next_page();
        feed.next_completion().await;

        assert_eq!(feed.filtered_items().as_ref(), feed.items());

        feed.set_search_query("abc");
        let titles: Vec<String> = feed
            .filtered_items()
            .iter()
            .map(|record| record.title().to_string())
            .collect();

        assert_eq!(titles, vec!["abcde", "zabc"]);
        assert_eq!(feed.items().len(), 3);
    }

    #[tokio::test]
    async fn test_item_appeared_only_triggers_on_last_record() {
        let source = Arc::new(MockPhotoSource::new());
        source.push_page(make_page(1, 30));
        let mut feed = controller(&source);
        feed.load_next_page();
        feed.next_completion().await;

        let middle = feed.items()[11].clone();
        let last = feed.items()[29].clone();

        assert!(!feed.item_appeared(&middle));
        assert!(feed.item_appeared(&last));
        assert!(!feed.item_appeared(&last));

        feed.next_completion().await;
        assert_eq!(source.calls(), vec![(1, 30), (2, 30)]);
    }

    #[tokio::test]
    async fn test_item_appeared_ignores_earlier_record_sharing_last_id() {
        let source = Arc::new(MockPhotoSource::new());
        source.push_page(vec![
            PhotoRecord::new(PhotoId(7), "first copy", "https://example.com/600/a"),
            PhotoRecord::new(PhotoId(7), "second copy", "https://example.com/600/b"),
        ]);
        let mut feed = controller(&source);
        feed.load_next_page();
        feed.next_completion().await;

        let earlier = feed.items()[0].clone();
        assert_eq!(earlier.id(), feed.items()[1].id());

        assert!(!feed.item_appeared(&earlier));
        assert!(!feed.is_loading());
        assert_eq!(source.calls(), vec![(1, 30)]);
    }

    #[tokio::test]
    async fn test_snapshot_is_published() {
        let source = Arc::new(MockPhotoSource::new());
        source.push_page(make_page(1, 10));
        let mut feed = controller(&source);
        let snapshots = feed.subscribe();

        feed.load_next_page();
        assert!(snapshots.borrow().is_loading);

        feed.next_completion().await;
        feed.set_search_query("photo 1");

        let snapshot = snapshots.borrow().clone();
        assert_eq!(snapshot.items.len(), 10);
        assert_eq!(snapshot.current_page, 2);
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.search_query, "photo 1");
        assert_eq!(snapshot.last_error, None);

        let titles: Vec<_> = snapshot.filtered.iter().map(PhotoRecord::title).collect();
        assert_eq!(titles, vec!["photo 1", "photo 10"]);
        assert_eq!(snapshot, feed.snapshot());
    }
}
