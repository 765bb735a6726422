//! Reference images and the request that carries them.

use image::ImageFormat;
use std::path::Path;

use crate::error::InputError;

/// Image formats the service accepts as inline reference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    /// Map a detected format onto the allow-list.
    pub fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }
}

/// One reference image, held in memory for the lifetime of a request.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    /// Display name (file name for loaded files)
    pub name: String,
    /// Raw file bytes, sent unchanged
    pub bytes: Vec<u8>,
    /// Format detected from the leading bytes, if recognised at all
    pub format: Option<ImageFormat>,
}

impl ReferenceImage {
    /// Wrap an in-memory buffer, sniffing its format from content.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let format = image::guess_format(&bytes).ok();
        Self {
            name: name.into(),
            bytes,
            format,
        }
    }

    /// Read an image file from disk.
    ///
    /// Format is detected by content, so a PNG saved as `.jpg` is still a PNG.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        if !path.exists() {
            return Err(InputError::FileNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|e| InputError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self::from_bytes(display_name(path), bytes))
    }

    /// Size of the image payload in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// The allow-listed kind of this image, or `None` if it is outside the list.
    pub fn kind(&self) -> Option<ImageKind> {
        self.format.and_then(ImageKind::from_format)
    }

    /// Human-readable format name for messages.
    pub fn format_name(&self) -> String {
        self.format
            .map(format_to_string)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Everything one generation needs: 1-3 images plus the free-text instruction.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub images: Vec<ReferenceImage>,
    pub instruction: String,
}

impl GenerationRequest {
    pub fn new(images: Vec<ReferenceImage>, instruction: impl Into<String>) -> Self {
        Self {
            images,
            instruction: instruction.into(),
        }
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Ico => "ico".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}
