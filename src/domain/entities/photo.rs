//! Photo record value object.

use std::fmt;

/// Server-assigned photo identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoId(pub i64);

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for PhotoId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One photo entry of the remote feed.
///
/// Immutable once decoded. Two records are equal only when every field matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    id: PhotoId,
    title: String,
    url: String,
}

impl PhotoRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(id: impl Into<PhotoId>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> PhotoId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the image locator.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Case-sensitive substring match against the title.
    #[must_use]
    pub fn title_contains(&self, needle: &str) -> bool {
        self.title.contains(needle)
    }
}
