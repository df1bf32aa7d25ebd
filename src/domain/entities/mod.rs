//! Domain entity definitions.

mod image;
mod photo;

pub use self::image::ImageStatus;
pub use photo::{PhotoId, PhotoRecord};
