use serde::Deserialize;

use crate::domain::entities::PhotoRecord;

/// One element of the `/photos` response array.
#[derive(Debug, Deserialize)]
pub struct PhotoDto {
    /// Server-assigned photo ID.
    pub id: i64,
    /// Photo title.
    pub title: String,
    /// Full-size image URL.
    pub url: String,
}

impl From<PhotoDto> for PhotoRecord {
    fn from(dto: PhotoDto) -> Self {
        Self::new(dto.id, dto.title, dto.url)
    }
}
