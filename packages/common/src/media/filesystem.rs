use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::data_uri::DecodedImage;
use super::error::MediaError;
use super::hash::ContentHash;
use super::key::MediaKey;
use super::traits::{BoxReader, MediaStore};

/// Filesystem-backed media store.
///
/// Files live in a sharded layout:
/// `{base_path}/{first 2 hex chars}/{remaining 62 hex chars}.{ext}`
pub struct FilesystemMediaStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemMediaStore {
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, MediaError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    fn file_path(&self, key: &MediaKey) -> PathBuf {
        self.base_path.join(key.hash.shard_prefix()).join(format!(
            "{}.{}",
            key.hash.shard_suffix(),
            key.format.extension()
        ))
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn put(&self, image: &DecodedImage) -> Result<MediaKey, MediaError> {
        let size = image.bytes.len() as u64;
        if size > self.max_size {
            return Err(MediaError::SizeLimitExceeded {
                actual: size,
                limit: self.max_size,
            });
        }

        let key = MediaKey {
            hash: ContentHash::compute(&image.bytes),
            format: image.format,
        };
        let path = self.file_path(&key);
        if fs::try_exists(&path).await? {
            return Ok(key);
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, &image.bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Rename is atomic, so concurrent uploads of the same image settle on one file.
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(%key, size, "Stored media file");
        Ok(key)
    }

    async fn get_stream(&self, key: &MediaKey) -> Result<BoxReader, MediaError> {
        match fs::File::open(self.file_path(key)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MediaError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &MediaKey) -> Result<bool, MediaError> {
        Ok(fs::try_exists(self.file_path(key)).await?)
    }

    async fn delete(&self, key: &MediaKey) -> Result<bool, MediaError> {
        match fs::remove_file(self.file_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
