//! Input validation before any network call.

use std::path::Path;

use super::image::{display_name, GenerationRequest, ReferenceImage};
use crate::config::LimitsConfig;
use crate::error::InputError;

/// Validates reference images and requests.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check a whole request.
    ///
    /// Fails when:
    /// - no images are supplied, or more than `max_images`
    /// - any image is larger than `max_file_size_mb`
    /// - any image is not JPEG, PNG or WEBP by content
    /// - the instruction is empty or whitespace-only
    pub fn validate(&self, request: &GenerationRequest) -> Result<(), InputError> {
        if request.images.is_empty() {
            return Err(InputError::NoImages);
        }
        if request.images.len() > self.limits.max_images {
            return Err(InputError::TooManyImages {
                count: request.images.len(),
                max: self.limits.max_images,
            });
        }

        for image in &request.images {
            self.validate_image(image)?;
        }

        if request.instruction.trim().is_empty() {
            return Err(InputError::EmptyInstruction);
        }

        Ok(())
    }

    /// Check one image against the size bound and the format allow-list.
    pub fn validate_image(&self, image: &ReferenceImage) -> Result<(), InputError> {
        let max_bytes = self.limits.max_file_size_bytes();
        if image.size() > max_bytes {
            return Err(InputError::FileTooLarge {
                name: image.name.clone(),
                size_bytes: image.size(),
                max_bytes,
            });
        }

        if image.kind().is_none() {
            return Err(InputError::UnsupportedFormat {
                name: image.name.clone(),
                format: image.format_name(),
            });
        }

        Ok(())
    }

    /// Load and check a single file, as the shell does when an image is picked.
    ///
    /// The size is checked from file metadata first so oversized files are
    /// never read into memory.
    pub fn load_image(&self, path: &Path) -> Result<ReferenceImage, InputError> {
        if !path.exists() {
            return Err(InputError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| InputError::Read {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {e}"),
        })?;

        let max_bytes = self.limits.max_file_size_bytes();
        if metadata.len() > max_bytes {
            return Err(InputError::FileTooLarge {
                name: display_name(path),
                size_bytes: metadata.len(),
                max_bytes,
            });
        }

        let image = ReferenceImage::load(path)?;
        self.validate_image(&image)?;
        Ok(image)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::image::tests::encoded;
    use image::ImageFormat;

    const MIB: usize = 1024 * 1024;

    fn png(name: &str) -> ReferenceImage {
        ReferenceImage::from_bytes(name, encoded(ImageFormat::Png))
    }

    /// A buffer with a valid JPEG signature padded to `len` bytes.
    fn jpeg_of_len(len: usize) -> ReferenceImage {
        let mut bytes = encoded(ImageFormat::Jpeg);
        bytes.resize(len, 0);
        ReferenceImage::from_bytes("padded.jpg", bytes)
    }

    #[test]
    fn test_rejects_zero_images() {
        let request = GenerationRequest::new(vec![], "a cat astronaut");
        let err = Validator::default().validate(&request).unwrap_err();
        assert!(matches!(err, InputError::NoImages));
    }

    #[test]
    fn test_rejects_more_than_three_images() {
        let images = (0..4).map(|i| png(&format!("{i}.png"))).collect();
        let request = GenerationRequest::new(images, "a cat astronaut");
        let err = Validator::default().validate(&request).unwrap_err();
        assert!(matches!(
            err,
            InputError::TooManyImages { count: 4, max: 3 }
        ));
    }

    #[test]
    fn test_accepts_one_to_three_images() {
        let validator = Validator::default();
        for n in 1..=3 {
            let images = (0..n).map(|i| png(&format!("{i}.png"))).collect();
            let request = GenerationRequest::new(images, "a cat astronaut");
            assert!(validator.validate(&request).is_ok(), "{n} images");
        }
    }

    #[test]
    fn test_accepts_every_allowed_format() {
        let images = [
            ("a.jpg", ImageFormat::Jpeg),
            ("b.png", ImageFormat::Png),
            ("c.webp", ImageFormat::WebP),
        ]
        .into_iter()
        .map(|(name, format)| ReferenceImage::from_bytes(name, encoded(format)))
        .collect();
        let request = GenerationRequest::new(images, "scene");
        assert!(Validator::default().validate(&request).is_ok());
    }

    #[test]
    fn test_load_image_accepts_webp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.webp");
        std::fs::write(&path, encoded(ImageFormat::WebP)).unwrap();

        let image = Validator::default().load_image(&path).unwrap();
        assert_eq!(image.kind(), Some(crate::input::image::ImageKind::Webp));
    }

    #[test]
    fn test_size_bound_is_inclusive() {
        let validator = Validator::default();
        let at_limit = GenerationRequest::new(vec![jpeg_of_len(10 * MIB)], "scene");
        assert!(validator.validate(&at_limit).is_ok());

        let over = GenerationRequest::new(vec![jpeg_of_len(10 * MIB + 1)], "scene");
        let err = validator.validate(&over).unwrap_err();
        assert!(matches!(err, InputError::FileTooLarge { .. }));
    }

    #[test]
    fn test_rejects_format_outside_allow_list() {
        let mut bmp = b"BM".to_vec();
        bmp.resize(64, 0);
        let request = GenerationRequest::new(
            vec![png("ok.png"), ReferenceImage::from_bytes("old.bmp", bmp)],
            "scene",
        );
        let err = Validator::default().validate(&request).unwrap_err();
        match err {
            InputError::UnsupportedFormat { name, format } => {
                assert_eq!(name, "old.bmp");
                assert_eq!(format, "bmp");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_empty_and_whitespace_text() {
        let validator = Validator::default();
        for text in ["", "   ", "\n\t "] {
            let request = GenerationRequest::new(vec![png("a.png")], text);
            let err = validator.validate(&request).unwrap_err();
            assert!(matches!(err, InputError::EmptyInstruction), "{text:?}");
        }
    }

    #[test]
    fn test_load_image_rejects_oversized_file_from_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.jpg");
        let mut bytes = encoded(ImageFormat::Jpeg);
        bytes.resize(11 * MIB, 0);
        std::fs::write(&path, bytes).unwrap();

        let err = Validator::default().load_image(&path).unwrap_err();
        assert!(matches!(err, InputError::FileTooLarge { name, .. } if name == "huge.jpg"));
    }

    #[test]
    fn test_load_image_accepts_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.png");
        std::fs::write(&path, encoded(ImageFormat::Png)).unwrap();

        let image = Validator::default().load_image(&path).unwrap();
        assert_eq!(image.name, "ref.png");
    }

    #[test]
    fn test_custom_limits() {
        let validator = Validator::new(LimitsConfig {
            max_images: 1,
            ..LimitsConfig::default()
        });
        let request = GenerationRequest::new(vec![png("a.png"), png("b.png")], "scene");
        assert!(matches!(
            validator.validate(&request).unwrap_err(),
            InputError::TooManyImages { count: 2, max: 1 }
        ));
    }
}
