//! Port definition for image caching.

use std::sync::Arc;

use image::DynamicImage;

/// Shared key-to-decoded-image store.
///
/// Implementations must be thread-safe. Concurrent `put` calls for one key are
/// last-write-wins.
pub trait ImageCachePort: Send + Sync {
    /// Returns the cached image for `key`, if any.
    fn get(&self, key: &str) -> Option<Arc<DynamicImage>>;

    /// Stores an image under `key`.
    fn put(&self, key: String, image: Arc<DynamicImage>);

    /// Returns the current number of cached images.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all images from the cache.
    fn clear(&self);
}
