//! Image handling infrastructure.
//!
//! This module provides:
//! - A shared in-memory cache of decoded images
//! - Per-locator async loaders that consult the cache before downloading

pub mod loader;
pub mod memory_cache;

pub use loader::{ImageLoader, ImageLoaderFactory};
pub use memory_cache::{CacheStats, MemoryImageCache};
