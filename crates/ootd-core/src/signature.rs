//! Magic-byte signature sniffing for image payloads.
//!
//! Classifies raw bytes by their leading signature. A `None` result means the
//! format is undetermined by the header, not that the payload is corrupt.

use serde::{Deserialize, Serialize};

/// Image formats recognized by signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    Webp,
}

impl ImageFormat {
    /// File extension used when storing an image of this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
        }
    }

    /// MIME type for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Webp => "image/webp",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Magic byte signatures, checked in declaration order.
///
/// Order is the tie-break when a payload could match several prefixes.
pub const IMAGE_SIGNATURES: &[(&[u8], ImageFormat)] = &[
    (&[0xFF, 0xD8, 0xFF], ImageFormat::Jpeg),
    (b"\x89PNG\r\n\x1a\n", ImageFormat::Png),
    (b"GIF87a", ImageFormat::Gif),
    (b"GIF89a", ImageFormat::Gif),
    (b"BM", ImageFormat::Bmp),
    (b"II*\x00", ImageFormat::Tiff), // little-endian
    (b"MM\x00*", ImageFormat::Tiff), // big-endian
    (b"RIFF", ImageFormat::Webp),
];

/// Detect the image format of a payload from its leading bytes.
pub fn detect(data: &[u8]) -> Option<ImageFormat> {
    IMAGE_SIGNATURES
        .iter()
        .find(|(magic, _)| data.starts_with(magic))
        .map(|(_, format)| *format)
}
