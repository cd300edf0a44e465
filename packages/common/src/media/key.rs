use std::fmt;
use std::str::FromStr;

use super::data_uri::ImageFormat;
use super::error::MediaError;
use super::hash::ContentHash;

/// Name of a stored image: `<sha256 hex>.<extension>`.
///
/// This is what the database keeps in `user.avatar` and `recipe.image`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MediaKey {
    pub hash: ContentHash,
    pub format: ImageFormat,
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.hash, self.format.extension())
    }
}

impl FromStr for MediaKey {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (stem, ext) = s
            .rsplit_once('.')
            .ok_or_else(|| MediaError::InvalidKey(format!("missing extension in '{s}'")))?;
        let format = ImageFormat::from_extension(ext)
            .ok_or_else(|| MediaError::InvalidKey(format!("unknown extension '{ext}'")))?;
        Ok(Self {
            hash: ContentHash::from_hex(stem)?,
            format,
        })
    }
}
