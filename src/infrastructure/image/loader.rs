//! Per-locator image loader.
//!
//! Each loader is bound to one locator and exposes an observable [`ImageStatus`].
//! The shared cache is consulted first; on a miss the bytes are downloaded and
//! decoded on a spawned task. Dropping the loader aborts its tasks, and a task
//! that outlives its loader publishes nothing and caches nothing. The loader's
//! `alive` flag is cleared under its lock on drop, and a task holds that lock
//! while it caches and publishes, so the two never interleave.

use std::sync::{Arc, Weak};

use bytes::Bytes;
use image::DynamicImage;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::domain::entities::ImageStatus;
use crate::domain::errors::ImageError;
use crate::domain::ports::{ImageCachePort, ImageFetchPort};

/// Loads and exposes exactly one image.
pub struct ImageLoader {
    url: Option<String>,
    cache: Arc<dyn ImageCachePort>,
    fetcher: Arc<dyn ImageFetchPort>,
    status_tx: Arc<watch::Sender<ImageStatus>>,
    alive: Arc<Mutex<bool>>,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("url", &self.url)
            .field("status", &*self.status_tx.borrow())
            .finish_non_exhaustive()
    }
}

impl ImageLoader {
    /// Creates a loader for `url`. With no locator, `load` never does anything.
    #[must_use]
    pub fn new(
        url: Option<String>,
        cache: Arc<dyn ImageCachePort>,
        fetcher: Arc<dyn ImageFetchPort>,
    ) -> Self {
        let (status_tx, _) = watch::channel(ImageStatus::NotStarted);
        Self {
            url,
            cache,
            fetcher,
            status_tx: Arc::new(status_tx),
            alive: Arc::new(Mutex::new(true)),
            tasks: Vec::new(),
        }
    }

    /// Returns the bound locator.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> ImageStatus {
        self.status_tx.borrow().clone()
    }

    /// Returns the decoded image, or `None` while the placeholder should show.
    #[must_use]
    pub fn image(&self) -> Option<Arc<DynamicImage>> {
        self.status_tx.borrow().image().cloned()
    }

    /// Subscribes to status updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ImageStatus> {
        self.status_tx.subscribe()
    }

    /// Starts loading.
    ///
    /// A cached image becomes `Ready` before this returns and no request is made.
    /// Otherwise a download is spawned; calling again before it finishes issues
    /// another request. Must be called within a tokio runtime on a miss.
    pub fn load(&mut self) {
        let Some(url) = self.url.clone() else {
            trace!("No image locator, skipping load");
            return;
        };

        if let Some(image) = self.cache.get(&url) {
            trace!(url = %url, "Image served from memory cache");
            self.status_tx.send_replace(ImageStatus::Ready(image));
            return;
        }

        self.tasks.retain(|task| !task.is_finished());

        let job = FetchJob {
            url,
            cache: Arc::clone(&self.cache),
            fetcher: Arc::clone(&self.fetcher),
            status_tx: Arc::downgrade(&self.status_tx),
            alive: Arc::clone(&self.alive),
        };
        self.status_tx.send_replace(ImageStatus::Downloading);
        self.tasks.push(tokio::spawn(job.run()));
    }

    /// Aborts any download still in flight.
    pub fn cancel(&mut self) {
        let mut cancelled = 0usize;
        for task in self.tasks.drain(..) {
            if !task.is_finished() {
                task.abort();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!(url = ?self.url, cancelled, "Cancelled image load");
        }
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        *self.alive.lock() = false;
        self.cancel();
    }
}

/// One download-and-decode run, detached from the loader.
struct FetchJob {
    url: String,
    cache: Arc<dyn ImageCachePort>,
    fetcher: Arc<dyn ImageFetchPort>,
    status_tx: Weak<watch::Sender<ImageStatus>>,
    alive: Arc<Mutex<bool>>,
}

impl FetchJob {
    /// Runs `f` with the status sender unless the loader has been dropped.
    ///
    /// The `alive` lock is held for the duration of `f`.
    fn with_live_sender(&self, f: impl FnOnce(&watch::Sender<ImageStatus>)) -> bool {
        let alive = self.alive.lock();
        if !*alive {
            return false;
        }
        match self.status_tx.upgrade() {
            Some(status_tx) => {
                f(&status_tx);
                true
            }
            None => false,
        }
    }

    async fn run(self) {
        let result = self.fetch_and_decode().await;

        let published = self.with_live_sender(|status_tx| match result {
            Ok(image) => {
                let image = Arc::new(image);
                self.cache.put(self.url.clone(), image.clone());
                debug!(url = %self.url, "Image loaded");
                status_tx.send_replace(ImageStatus::Ready(image));
            }
            Err(error) => {
                warn!(url = %self.url, error = %error, "Image failed to load");
                status_tx.send_replace(ImageStatus::Failed(error.to_string()));
            }
        });

        if !published {
            trace!(url = %self.url, "Loader dropped, discarding image");
        }
    }

    async fn fetch_and_decode(&self) -> Result<DynamicImage, ImageError> {
        debug!(url = %self.url, "Downloading image");
        let bytes = self.fetcher.fetch_bytes(&self.url).await?;

        self.with_live_sender(|status_tx| {
            status_tx.send_replace(ImageStatus::Decoding);
        });

        decode(bytes).await
    }
}

async fn decode(bytes: Bytes) -> Result<DynamicImage, ImageError> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| ImageError::decode(format!("decode task panicked: {e}")))?
        .map_err(|e| ImageError::decode(e.to_string()))
}

/// Builds loaders that share one cache and one fetcher.
#[derive(Clone)]
pub struct ImageLoaderFactory {
    cache: Arc<dyn ImageCachePort>,
    fetcher: Arc<dyn ImageFetchPort>,
}

impl ImageLoaderFactory {
    /// Creates a factory.
    #[must_use]
    pub fn new(cache: Arc<dyn ImageCachePort>, fetcher: Arc<dyn ImageFetchPort>) -> Self {
        Self { cache, fetcher }
    }

    /// Creates a loader for `url`.
    #[must_use]
    pub fn loader(&self, url: Option<&str>) -> ImageLoader {
        ImageLoader::new(
            url.map(str::to_owned),
            Arc::clone(&self.cache),
            Arc::clone(&self.fetcher),
        )
    }
}
