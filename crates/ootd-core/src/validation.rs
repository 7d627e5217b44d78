//! Image payload validation.
//!
//! A payload is a genuine image when it is non-empty, within
//! [`MAX_IMAGE_SIZE_BYTES`], and carries a recognized signature. The policy is
//! strict: well-formed images in formats missing from the signature table are
//! rejected. Validation is pure so it can run at upload time and again before
//! analysis.

use thiserror::Error;

use crate::defaults::{MAX_IMAGE_SIZE_BYTES, SUPPORTED_FORMATS_LABEL};
use crate::signature::{self, ImageFormat};

/// Reason an image payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("image data is empty")]
    Empty,

    #[error("image exceeds the size limit, maximum allowed is {}MB", .limit / 1024 / 1024)]
    TooLarge { size: usize, limit: usize },

    #[error(
        "unsupported file format, please upload a valid image file (supported formats: {})",
        SUPPORTED_FORMATS_LABEL
    )]
    UnsupportedFormat,
}

impl From<ImageError> for crate::Error {
    fn from(e: ImageError) -> Self {
        crate::Error::InvalidContent(e.to_string())
    }
}

/// Check only the size bound (empty or above the limit).
pub fn check_size(data: &[u8]) -> Result<(), ImageError> {
    if data.is_empty() {
        return Err(ImageError::Empty);
    }
    if data.len() > MAX_IMAGE_SIZE_BYTES {
        return Err(ImageError::TooLarge {
            size: data.len(),
            limit: MAX_IMAGE_SIZE_BYTES,
        });
    }
    Ok(())
}

/// Validate a payload, returning the detected format.
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, ImageError> {
    check_size(data)?;
    signature::detect(data).ok_or(ImageError::UnsupportedFormat)
}

/// Whether a payload is accepted as genuine image data.
pub fn is_valid_image(data: &[u8]) -> bool {
    validate_image(data).is_ok()
}
