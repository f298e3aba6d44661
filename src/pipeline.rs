//! Request pipeline: cache-backed resize-and-serve orchestration.
//!
//! The pipeline drives one image request end to end:
//!
//! 1. Existence check against the backing image directory
//! 2. Cache-key derivation (`filename` or `filename_{W}x{H}`)
//! 3. Cache lookup; hits return the stored payload directly
//! 4. On miss: load original bytes, optionally resize, populate the cache
//! 5. Statistics recording along every path
//!
//! Two concurrent misses for the same key may both resize and both write;
//! the last write wins. There is no request coalescing and no per-key mutual
//! exclusion.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::images::{ImageKind, ImageStore, Resizer, Resolution};
use crate::stats::{StatisticsEngine, ORIGINAL_LABEL};
use crate::store::KeyValueStore;

// =============================================================================
// Response
// =============================================================================

/// Result of a successful image request.
#[derive(Debug, Clone)]
pub struct ImageResponse {
    /// The payload to serve
    pub data: Bytes,

    /// Content type derived from the filename extension
    pub content_type: &'static str,

    /// Whether the payload came from the cache
    pub cache_hit: bool,
}

// =============================================================================
// Pipeline
// =============================================================================

/// Orchestrates cache lookups, resizing and statistics for image requests.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use pixelserve::pipeline::ImagePipeline;
/// use pixelserve::images::ImageStore;
/// use pixelserve::store::MemoryStore;
///
/// let store = Arc::new(MemoryStore::new());
/// let images = ImageStore::new("images");
/// let pipeline = ImagePipeline::new(store, images);
///
/// let response = pipeline.fetch("photo.jpg", Some("800x600".parse()?)).await?;
/// println!("{} bytes, hit: {}", response.data.len(), response.cache_hit);
/// ```
pub struct ImagePipeline<S: KeyValueStore> {
    store: Arc<S>,
    images: ImageStore,
    resizer: Resizer,
    stats: StatisticsEngine<S>,
}

impl<S: KeyValueStore> ImagePipeline<S> {
    /// Create a pipeline over the given store and image directory.
    pub fn new(store: Arc<S>, images: ImageStore) -> Self {
        let stats = StatisticsEngine::new(Arc::clone(&store));
        Self {
            store,
            images,
            resizer: Resizer::new(),
            stats,
        }
    }

    /// The statistics engine sharing this pipeline's store.
    pub fn stats(&self) -> &StatisticsEngine<S> {
        &self.stats
    }

    /// The backing image store.
    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// The shared key-value store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Derive the cache key for a request.
    ///
    /// `filename` for originals, `filename_{W}x{H}` for resized variants.
    pub fn cache_key(filename: &str, resolution: Option<&Resolution>) -> String {
        match resolution {
            Some(resolution) => format!("{filename}_{resolution}"),
            None => filename.to_string(),
        }
    }

    /// Serve an image, resizing on demand and caching the result.
    ///
    /// `filename` and `resolution` are assumed syntactically valid; the HTTP
    /// layer validates them before calling in.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NotFound`] when the image is absent from the
    ///   backing directory (recorded as both an error and a miss)
    /// - [`PipelineError::Transform`] when the resize primitive fails
    ///   (recorded as an error; nothing is written to the cache)
    /// - [`PipelineError::Store`] when the key-value store fails on the hot
    ///   path; never retried
    pub async fn fetch(
        &self,
        filename: &str,
        resolution: Option<Resolution>,
    ) -> Result<ImageResponse, PipelineError> {
        let kind = ImageKind::from_filename(filename);

        // Existence check comes first; no cache key is derived for a
        // missing image.
        if !self.images.exists(filename).await {
            warn!(filename, "requested image does not exist");
            self.stats.record_error().await?;
            self.stats.record_miss().await?;
            return Err(PipelineError::NotFound {
                filename: filename.to_string(),
            });
        }

        let key = Self::cache_key(filename, resolution.as_ref());

        if let Some(cached) = self.store.get(&key).await? {
            debug!(%key, "cache hit");
            let label = resolution
                .map(|r| r.to_string())
                .unwrap_or_else(|| ORIGINAL_LABEL.to_string());
            self.stats.record_hit(&label, filename).await?;
            return Ok(ImageResponse {
                data: cached,
                content_type: kind.content_type(),
                cache_hit: true,
            });
        }

        debug!(%key, "cache miss");
        let started = Instant::now();

        let original = self.images.read(filename).await?;
        let data = match resolution {
            Some(resolution) => {
                let resized = match self.resizer.resize(&original, resolution, kind) {
                    Ok(resized) => resized,
                    Err(err) => {
                        warn!(filename, %resolution, error = %err, "resize failed");
                        self.stats.record_error().await?;
                        return Err(err.into());
                    }
                };
                self.stats.record_resize().await?;
                self.stats.bump_resolution(&resolution.to_string()).await?;
                resized
            }
            None => original,
        };

        self.store.set(&key, data.clone()).await?;
        self.stats.record_miss().await?;

        // The timer covers the miss path only; hits are not timed. The
        // average must fold in before this request's own totalRequests
        // increment.
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.stats.record_processing_time(elapsed_ms).await?;
        self.stats.bump_image(filename).await?;
        self.stats.record_request().await?;

        Ok(ImageResponse {
            data,
            content_type: kind.content_type(),
            cache_hit: false,
        })
    }
}

impl<S: KeyValueStore> Clone for ImagePipeline<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            images: self.images.clone(),
            resizer: self.resizer.clone(),
            stats: self.stats.clone(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
