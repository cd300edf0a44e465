use thiserror::Error;

/// Errors raised while decoding, storing or loading media files.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The stored file was not found.
    #[error("media not found: {0}")]
    NotFound(String),

    #[error("media IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A media key or content hash could not be parsed.
    #[error("invalid media key: {0}")]
    InvalidKey(String),

    /// The submitted image payload is not a usable data URI.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("image exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
