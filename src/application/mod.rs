//! Application layer with the feed controller and filtering.

/// Feed state and filtering services.
pub mod services;

pub use services::{FeedSnapshot, PageOutcome, PhotoFeedController, filter_by_title};
