//! Photo feed error types.

use thiserror::Error;

/// Failure of one page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum FeedError {
    #[error("network error while fetching photos: {message}")]
    Network { message: String },

    #[error("photo API returned HTTP {status}")]
    Status { status: u16 },

    #[error("failed to decode photo page: {message}")]
    Decode { message: String },

    #[error("unexpected feed error: {message}")]
    Unexpected { message: String },
}

impl FeedError {
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

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Status { .. })
    }
}
