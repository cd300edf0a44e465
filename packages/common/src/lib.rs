pub mod media;

pub use media::{DecodedImage, ImageFormat, MediaError, MediaKey, MediaStore};
