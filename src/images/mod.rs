//! Image loading and transformation.
//!
//! This module provides the two thin adapters at the edge of the pipeline:
//!
//! - [`ImageStore`] reads original image bytes from a named-file directory
//! - [`Resizer`] invokes the resize primitive on raw bytes
//!
//! Both are deliberately small; the interesting behavior (cache keys,
//! hit/miss decisions, statistics) lives in the pipeline and statistics
//! engine.

mod resize;
mod store;

pub use resize::{ParseResolutionError, Resizer, Resolution, DEFAULT_JPEG_QUALITY};
pub use store::ImageStore;

/// Output encoding for a served image, derived from the filename extension.
///
/// `.png` maps to PNG; any other recognized extension is treated as JPEG,
/// matching the service's content-type rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Derive the output kind from a filename extension.
    pub fn from_filename(filename: &str) -> Self {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if extension == "png" {
            ImageKind::Png
        } else {
            ImageKind::Jpeg
        }
    }

    /// The HTTP `Content-Type` for this kind.
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
        }
    }
}
