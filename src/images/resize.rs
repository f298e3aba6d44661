//! Image resize primitive.
//!
//! Wraps the `image` crate: decode the source bytes, resize exactly to the
//! requested dimensions, and re-encode in the output format derived from the
//! filename extension. PNG output goes through the PNG encoder; everything
//! else is encoded as JPEG at a fixed quality.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::ImageReader;

use crate::error::TransformError;

use super::ImageKind;

/// JPEG quality used when re-encoding resized images.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

// =============================================================================
// Resolution
// =============================================================================

/// A target resolution in `{width}x{height}` form.
///
/// Both dimensions must be positive. Parsed from the `resolution` query
/// parameter and printed back as the label used in the resolution frequency
/// map (e.g. `"800x600"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Create a resolution; returns `None` if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            None
        } else {
            Some(Self { width, height })
        }
    }
}

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s.split_once('x').ok_or(ParseResolutionError)?;
        let width: u32 = width.parse().map_err(|_| ParseResolutionError)?;
        let height: u32 = height.parse().map_err(|_| ParseResolutionError)?;
        Resolution::new(width, height).ok_or(ParseResolutionError)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The resolution string was not `{width}x{height}` with positive integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseResolutionError;

impl fmt::Display for ParseResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resolution must be in the format {{width}}x{{height}}")
    }
}

impl std::error::Error for ParseResolutionError {}

// =============================================================================
// Resizer
// =============================================================================

/// Resize primitive: raw bytes in, transformed bytes out.
#[derive(Debug, Clone, Default)]
pub struct Resizer {
    // Stateless; struct allows future extension (quality settings, pools)
}

impl Resizer {
    /// Create a new resizer.
    pub fn new() -> Self {
        Self {}
    }

    /// Decode `source`, resize to exactly `resolution`, and re-encode as
    /// `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Decode`] when the source bytes are not a
    /// decodable image, and [`TransformError::Encode`] when re-encoding
    /// fails.
    pub fn resize(
        &self,
        source: &[u8],
        resolution: Resolution,
        kind: ImageKind,
    ) -> Result<Bytes, TransformError> {
        let reader = ImageReader::new(Cursor::new(source))
            .with_guessed_format()
            .map_err(|e| TransformError::Decode {
                message: e.to_string(),
            })?;
        let img = reader.decode().map_err(|e| TransformError::Decode {
            message: e.to_string(),
        })?;

        let resized = img.resize_exact(resolution.width, resolution.height, FilterType::Lanczos3);

        let mut output = Vec::new();
        match kind {
            ImageKind::Png => resized
                .write_with_encoder(PngEncoder::new(&mut output))
                .map_err(|e| TransformError::Encode {
                    message: e.to_string(),
                })?,
            ImageKind::Jpeg => resized
                .write_with_encoder(JpegEncoder::new_with_quality(
                    &mut output,
                    DEFAULT_JPEG_QUALITY,
                ))
                .map_err(|e| TransformError::Encode {
                    message: e.to_string(),
                })?,
        }

        Ok(Bytes::from(output))
    }
}

// =============================================================================
// Tests
// =============================================================================
