//! In-memory image cache shared by every loader.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::DynamicImage;
use lru::LruCache;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::domain::ports::ImageCachePort;

/// Decoded images keyed by locator.
///
/// Unbounded unless built with [`MemoryImageCache::with_capacity`], in which case
/// the least recently used entry is evicted first.
pub struct MemoryImageCache {
    cache: RwLock<LruCache<String, Arc<DynamicImage>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryImageCache {
    /// Creates an unbounded cache.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::from_lru(LruCache::unbounded())
    }

    /// Creates a cache holding at most `capacity` images.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self::from_lru(LruCache::new(cap))
    }

    /// Creates a cache from an optional capacity; `None` means unbounded.
    #[must_use]
    pub fn from_capacity(capacity: Option<usize>) -> Self {
        capacity.map_or_else(Self::unbounded, Self::with_capacity)
    }

    fn from_lru(cache: LruCache<String, Arc<DynamicImage>>) -> Self {
        Self {
            cache: RwLock::new(cache),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns true if `key` is cached, without touching recency or counters.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.cache.read().contains(key)
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::fmt::Debug for MemoryImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryImageCache")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

impl ImageCachePort for MemoryImageCache {
    fn get(&self, key: &str) -> Option<Arc<DynamicImage>> {
        let mut cache = self.cache.write();
        if let Some(img) = cache.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key, "Memory cache hit");
            Some(img.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key, "Memory cache miss");
            None
        }
    }

    fn put(&self, key: String, image: Arc<DynamicImage>) {
        debug!(key = %key, "Storing image in memory cache");
        self.cache.write().put(key, image);
    }

    fn len(&self) -> usize {
        self.cache.read().len()
    }

    fn clear(&self) {
        self.cache.write().clear();
        debug!("Cleared memory image cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32) -> Arc<DynamicImage> {
        Arc::new(DynamicImage::new_rgb8(width, 10))
    }

    #[test]
    fn test_cache_put_and_get() {
        let cache = MemoryImageCache::unbounded();

        cache.put("https://example.com/1".into(), image(100));
        let retrieved = cache.get("https://example.com/1");

        assert_eq!(retrieved.map(|img| img.width()), Some(100));
    }

    #[test]
    fn test_cache_miss() {
        let cache = MemoryImageCache::unbounded();

        assert!(cache.get("https://example.com/missing").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let cache = MemoryImageCache::unbounded();

        cache.put("k".into(), image(10));
        cache.put("k".into(), image(20));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").map(|img| img.width()), Some(20));
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let cache = MemoryImageCache::unbounded();

        for i in 0..500 {
            cache.put(format!("https://example.com/{i}"), image(1));
        }

        assert_eq!(cache.len(), 500);
        assert!(cache.contains("https://example.com/0"));
    }

    #[test]
    fn test_bounded_evicts_least_recent() {
        let cache = MemoryImageCache::from_capacity(Some(2));

        cache.put("a".into(), image(1));
        cache.put("b".into(), image(1));
        let _ = cache.get("a");
        cache.put("c".into(), image(1));

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_cache_stats() {
        let cache = MemoryImageCache::unbounded();
        cache.put("k".into(), image(10));

        let _ = cache.get("k");
        let _ = cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(
            stats.to_string(),
            "Cache: 1 images, 50.0% hit rate (1 hits, 1 misses)"
        );
    }

    #[test]
    fn test_clear() {
        let cache = MemoryImageCache::unbounded();
        cache.put("k".into(), image(10));

        cache.clear();

        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_puts_do_not_corrupt() {
        let cache = Arc::new(MemoryImageCache::unbounded());

        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        cache.put("shared".into(), image(t + 1));
                        let _ = cache.get("shared");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 1);
        assert!(cache.get("shared").is_some_and(|img| (1..=8).contains(&img.width())));
    }
}
