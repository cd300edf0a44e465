mod data_uri;
mod error;
mod hash;
mod key;
mod traits;

pub mod filesystem;

pub use data_uri::{DecodedImage, ImageFormat, decode_data_uri};
pub use error::MediaError;
pub use hash::ContentHash;
pub use key::MediaKey;
pub use traits::{BoxReader, MediaStore};
