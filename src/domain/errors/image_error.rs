//! Image loading error types.

use thiserror::Error;

/// Failure of one image load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ImageError {
    #[error("network error while fetching image: {message}")]
    Network { message: String },

    #[error("image request returned HTTP {status}")]
    Status { status: u16 },

    #[error("failed to decode image: {message}")]
    Decode { message: String },
}

impl ImageError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
