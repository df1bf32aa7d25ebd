pub mod feed_controller;
pub mod title_filter;

pub use feed_controller::{
    DEFAULT_PAGE_SIZE, FeedSnapshot, PageCompletion, PageOutcome, PhotoFeedController,
};
pub use title_filter::filter_by_title;
