use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::data_uri::DecodedImage;
use super::error::MediaError;
use super::key::MediaKey;

pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Content-addressed storage for uploaded images.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an image and return its key. Storing identical bytes twice
    /// yields the same key and a single file.
    async fn put(&self, image: &DecodedImage) -> Result<MediaKey, MediaError>;

    /// Open a stored image for streaming.
    async fn get_stream(&self, key: &MediaKey) -> Result<BoxReader, MediaError>;

    async fn get(&self, key: &MediaKey) -> Result<Vec<u8>, MediaError> {
        let mut reader = self.get_stream(key).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    async fn exists(&self, key: &MediaKey) -> Result<bool, MediaError>;

    /// Returns `true` if a file was removed.
    async fn delete(&self, key: &MediaKey) -> Result<bool, MediaError>;
}
