mod image_cache_port;
mod image_fetch_port;
mod photo_source_port;

pub use image_cache_port::ImageCachePort;
pub use image_fetch_port::ImageFetchPort;
pub use photo_source_port::PhotoSourcePort;
