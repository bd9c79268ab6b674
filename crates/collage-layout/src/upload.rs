//! Image references for uploaded files.
//!
//! Reads complete before a piece is created; a failed read produces no piece.
//! Bytes must decode as an image before they become a reference, so every
//! image piece is renderable.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
pub use image::ImageFormat;

use crate::piece::ImageRef;

/// MIME type for an accepted upload format, `None` for anything else.
#[must_use]
pub const fn upload_mime_type(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// Encode raw image bytes as a `data:` URL image reference.
///
/// The format is guessed from the content and the bytes are fully decoded
/// once; truncated or corrupt files are rejected.
pub fn image_ref_from_bytes(bytes: &[u8]) -> Result<ImageRef, UploadError> {
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    let format = image::guess_format(bytes).map_err(|_| UploadError::UnsupportedFormat)?;
    let mime = upload_mime_type(format).ok_or(UploadError::UnsupportedFormat)?;
    let decoded =
        image::load_from_memory_with_format(bytes, format).map_err(UploadError::Decode)?;
    tracing::debug!(
        target: "collage.layout",
        mime,
        width = decoded.width(),
        height = decoded.height(),
        "image upload decoded"
    );
    Ok(ImageRef::new(format!(
        "data:{mime};base64,{}",
        STANDARD.encode(bytes)
    )))
}

/// Read an image file fully and encode it as a `data:` URL.
pub fn read_image_file(path: impl AsRef<Path>) -> Result<ImageRef, UploadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| UploadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    image_ref_from_bytes(&bytes)
}

/// Upload failures. No piece is created for a failed file.
#[derive(Debug)]
pub enum UploadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Empty,
    UnsupportedFormat,
    /// Recognized container, but the payload does not decode.
    Decode(image::ImageError),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read image {}: {source}", path.display())
            }
            Self::Empty => write!(f, "image file is empty"),
            Self::UnsupportedFormat => {
                write!(f, "unsupported image format (expected PNG, JPEG, GIF, or WebP)")
            }
            Self::Decode(error) => write!(f, "image does not decode: {error}"),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decode(error) => Some(error),
            Self::Empty | Self::UnsupportedFormat => None,
        }
    }
}
