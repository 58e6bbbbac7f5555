//! Reference image loading.
//!
//! The editor accepts a single PNG or JPEG. Bytes are sniffed and decoded with
//! the `image` crate to learn the dimensions, then kept as a data URI that is
//! handed to the host on save.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;

/// Errors that can occur when loading the reference image.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Bytes are not a PNG or JPEG
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Bytes looked like a supported image but failed to decode
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// I/O error when reading the file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded reference image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    /// `data:<mime>;base64,<payload>`
    pub data_uri: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

impl LoadedImage {
    /// Decode PNG or JPEG bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        let format = image::guess_format(bytes)
            .map_err(|_| ImageError::UnsupportedFormat("unrecognized data".to_string()))?;
        let mime_type = match format {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            other => return Err(ImageError::UnsupportedFormat(format!("{:?}", other))),
        };

        let decoded = image::load_from_memory_with_format(bytes, format)?;
        let loaded = Self {
            data_uri: format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)),
            mime_type,
            width: decoded.width(),
            height: decoded.height(),
        };
        log::info!(
            "Decoded {} image {}x{} ({} bytes)",
            mime_type,
            loaded.width,
            loaded.height,
            bytes.len()
        );
        Ok(loaded)
    }

    /// Read and decode an image file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: &std::path::Path) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}
