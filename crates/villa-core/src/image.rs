//! Image encoding
//!
//! Photos are stored inside the document as `data:` URLs, so every uploaded
//! file passes through an [`ImageEncoder`] before it becomes a `Photo`.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Errors turning a file into an image reference
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Unsupported image type: '{0}'. Use JPEG, PNG, GIF, WebP or SVG.")]
    UnsupportedType(String),

    #[error("Image file is empty: '{0}'")]
    Empty(PathBuf),

    #[error("Failed to read image '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Turns raw image bytes into an image reference a document can hold
pub trait ImageEncoder: Send + Sync {
    /// Encode `bytes`; `file_name` is used to pick the media type
    fn encode(&self, file_name: &str, bytes: &[u8]) -> Result<String, ImageError>;
}

/// Embeds the bytes unchanged as a base64 `data:` URL
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlEncoder;

impl ImageEncoder for DataUrlEncoder {
    fn encode(&self, file_name: &str, bytes: &[u8]) -> Result<String, ImageError> {
        let mime = mime_for(file_name)?;
        Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
    }
}

/// Media type for a file name, by extension
pub fn mime_for(file_name: &str) -> Result<&'static str, ImageError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "svg" => Ok("image/svg+xml"),
        "ico" => Ok("image/x-icon"),
        _ => Err(ImageError::UnsupportedType(file_name.to_string())),
    }
}

/// Read a file and encode it
pub async fn encode_file(encoder: &dyn ImageEncoder, path: &Path) -> Result<String, ImageError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ImageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(ImageError::Empty(path.to_path_buf()));
    }

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    encoder.encode(name, &bytes)
}
