//! Photogrid - paged photo feed and image loading core.
//!
//! This crate fetches pages of photo records from a JSON API, keeps them in a
//! filterable feed with infinite-scroll and refresh triggers, and loads the
//! images behind them through a shared in-memory cache.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the feed controller and filtering.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "photogrid";
