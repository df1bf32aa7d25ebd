//! Domain types for image loading.

use std::fmt;
use std::sync::Arc;

use image::DynamicImage;

/// Status of one image in the loading pipeline.
#[derive(Clone, Default)]
pub enum ImageStatus {
    /// Loading has not started, or there is no locator to load.
    #[default]
    NotStarted,
    /// Bytes are being downloaded.
    Downloading,
    /// Bytes are being decoded.
    Decoding,
    /// Image is decoded and ready for display.
    Ready(Arc<DynamicImage>),
    /// Loading failed; the placeholder stays visible.
    Failed(String),
}

impl ImageStatus {
    /// Returns the decoded image if ready.
    #[must_use]
    pub fn image(&self) -> Option<&Arc<DynamicImage>> {
        match self {
            Self::Ready(image) => Some(image),
            _ => None,
        }
    }

    /// Returns true if the image is ready for rendering.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Returns true if the image is currently being loaded.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Downloading | Self::Decoding)
    }

    /// Returns true if loading failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Debug for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::Downloading => write!(f, "Downloading"),
            Self::Decoding => write!(f, "Decoding"),
            Self::Ready(image) => write!(f, "Ready({}x{})", image.width(), image.height()),
            Self::Failed(message) => f.debug_tuple("Failed").field(message).finish(),
        }
    }
}
