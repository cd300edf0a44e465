use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::error::MediaError;

/// Image formats accepted for avatars and recipe pictures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Resolve the subtype of an `image/<subtype>` MIME type.
    pub fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" | "pjpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(Self::Png),
            "jpg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Check the file signature against the declared format.
    fn matches_signature(&self, bytes: &[u8]) -> bool {
        match self {
            Self::Png => bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Gif => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
            Self::Webp => bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        }
    }
}

/// An image decoded from an inline upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Decode a `data:image/<fmt>;base64,<payload>` URI.
pub fn decode_data_uri(input: &str) -> Result<DecodedImage, MediaError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(MediaError::InvalidImage("image must not be empty".into()));
    }

    let rest = input
        .strip_prefix("data:")
        .ok_or_else(|| MediaError::InvalidImage("expected a data URI".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| MediaError::InvalidImage("data URI has no payload".into()))?;
    let media_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| MediaError::InvalidImage("data URI must be base64-encoded".into()))?;
    let subtype = media_type
        .strip_prefix("image/")
        .ok_or_else(|| MediaError::InvalidImage(format!("unsupported media type '{media_type}'")))?;
    let format = ImageFormat::from_subtype(subtype)
        .ok_or_else(|| MediaError::InvalidImage(format!("unsupported image type '{subtype}'")))?;

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| MediaError::InvalidImage(format!("invalid base64 payload: {e}")))?;

    if bytes.is_empty() {
        return Err(MediaError::InvalidImage("image must not be empty".into()));
    }
    if !format.matches_signature(&bytes) {
        return Err(MediaError::InvalidImage(format!(
            "payload is not a valid {} file",
            format.extension()
        )));
    }

    Ok(DecodedImage { format, bytes })
}
