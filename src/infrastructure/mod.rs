//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Image handling (caching, loading).
pub mod image;
/// Photo API client.
pub mod photo_api;

pub use config::{AppConfig, CliArgs, ConfigError, ConfigLoader, LogLevel};
pub use self::image::{CacheStats, ImageLoader, ImageLoaderFactory, MemoryImageCache};
pub use photo_api::{DEFAULT_API_BASE, PhotoApiClient};
