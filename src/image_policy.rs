//! Bounds enforced on product images before a product is saved.

use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;

pub const MIN_RESOLUTION: (u32, u32) = (400, 400);
pub const MAX_RESOLUTION: (u32, u32) = (800, 800);
pub const MAX_IMAGE_SIZE: u64 = 3_145_728;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Image resolution {width}x{height} is below the minimum")]
    ResolutionTooLow { width: u32, height: u32 },

    #[error("Image resolution {width}x{height} is above the maximum")]
    ResolutionTooHigh { width: u32, height: u32 },

    #[error("Image is {0} bytes, larger than the allowed size")]
    FileTooLarge(u64),

    #[error("Image path must not be empty")]
    EmptyPath,
}

/// Metadata of an already uploaded image file.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImageUpload {
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
}

impl ImageUpload {
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.path.trim().is_empty() {
            return Err(ImageError::EmptyPath);
        }
        if self.size_bytes > MAX_IMAGE_SIZE {
            return Err(ImageError::FileTooLarge(self.size_bytes));
        }
        let (min_w, min_h) = MIN_RESOLUTION;
        if self.width < min_w || self.height < min_h {
            return Err(ImageError::ResolutionTooLow {
                width: self.width,
                height: self.height,
            });
        }
        let (max_w, max_h) = MAX_RESOLUTION;
        if self.width > max_w || self.height > max_h {
            return Err(ImageError::ResolutionTooHigh {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Validate an optional image and hand back the path to store.
pub fn accept_image(image: Option<&ImageUpload>) -> Result<Option<String>, ImageError> {
    match image {
        Some(image) => {
            image.validate()?;
            Ok(Some(image.path.trim().to_string()))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(width: u32, height: u32, size_bytes: u64) -> ImageUpload {
        ImageUpload {
            path: "photos/2024/01/01/x.jpg".into(),
            width,
            height,
            size_bytes,
        }
    }

    #[test]
    fn accepts_images_within_bounds() {
        assert!(upload(400, 400, 1024).validate().is_ok());
        assert!(upload(800, 800, MAX_IMAGE_SIZE).validate().is_ok());
        assert!(upload(640, 480, 200_000).validate().is_ok());
    }

    #[test]
    fn rejects_small_images() {
        assert_eq!(
            upload(399, 600, 1024).validate(),
            Err(ImageError::ResolutionTooLow {
                width: 399,
                height: 600
            })
        );
    }

    #[test]
    fn rejects_large_images() {
        assert_eq!(
            upload(801, 600, 1024).validate(),
            Err(ImageError::ResolutionTooHigh {
                width: 801,
                height: 600
            })
        );
        assert_eq!(
            upload(600, 600, MAX_IMAGE_SIZE + 1).validate(),
            Err(ImageError::FileTooLarge(MAX_IMAGE_SIZE + 1))
        );
    }

    #[test]
    fn missing_image_is_allowed() {
        assert_eq!(accept_image(None), Ok(None));
        let img = ImageUpload {
            path: "  ".into(),
            ..upload(500, 500, 10)
        };
        assert_eq!(accept_image(Some(&img)), Err(ImageError::EmptyPath));
    }
}
