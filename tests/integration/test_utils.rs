//! Test utilities for integration tests.
//!
//! Helpers for building image fixtures, spinning up a router over a
//! temporary image directory, and a key-value store that always fails.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageReader, Rgb, RgbImage};
use tower::ServiceExt;

use pixelserve::error::StoreError;
use pixelserve::store::{KeyValueStore, MemoryStore};
use pixelserve::{create_router, ImagePipeline, ImageStore, RouterConfig};

// =============================================================================
// Image Fixtures
// =============================================================================

/// Encode a solid-color JPEG of the given size.
pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 90, 30]));
    let mut out = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut out, 90))
        .unwrap();
    out
}

/// Encode a solid-color PNG of the given size.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 90, 200]));
    let mut out = Vec::new();
    img.write_with_encoder(PngEncoder::new(&mut out)).unwrap();
    out
}

/// Decode any supported image and return its dimensions.
pub fn decoded_dimensions(data: &[u8]) -> (u32, u32) {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap();
    (img.width(), img.height())
}

// =============================================================================
// Test Service
// =============================================================================

/// A router over a temporary image directory, with handles kept for
/// inspecting the store and pipeline directly.
pub struct TestService {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub pipeline: ImagePipeline<MemoryStore>,
    // Keeps the image directory alive for the duration of the test
    _images_dir: tempfile::TempDir,
}

/// Build a service whose image directory contains the given files.
pub async fn service_with_images(files: &[(&str, Vec<u8>)]) -> TestService {
    let images_dir = tempfile::tempdir().unwrap();
    for (name, data) in files {
        std::fs::write(images_dir.path().join(name), data).unwrap();
    }

    let store = Arc::new(MemoryStore::new());
    let pipeline = ImagePipeline::new(Arc::clone(&store), ImageStore::new(images_dir.path()));
    pipeline.stats().initialize().await.unwrap();

    let router = create_router(pipeline.clone(), RouterConfig::new().with_tracing(false));

    TestService {
        router,
        store,
        pipeline,
        _images_dir: images_dir,
    }
}

/// Number of keys the statistics initialization seeds into a fresh store.
pub const SEEDED_STATS_KEYS: usize = 8;

// =============================================================================
// Request Helpers
// =============================================================================

/// Issue a GET request and return the status and body bytes.
pub async fn get(router: &Router, uri: &str) -> (StatusCode, Bytes) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

/// Issue a GET request and return the status, content type and body bytes.
pub async fn get_with_content_type(router: &Router, uri: &str) -> (StatusCode, String, Bytes) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, body)
}

/// Fetch `/api/statistics` and parse the JSON report.
pub async fn statistics(router: &Router) -> serde_json::Value {
    let (status, body) = get(router, "/api/statistics").await;
    assert_eq!(status, StatusCode::OK, "statistics endpoint failed");
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Failing Store
// =============================================================================

/// A store whose every operation fails, for exercising the
/// store-unavailable paths.
#[derive(Debug, Default)]
pub struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Unavailable("injected failure".to_string())
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>, StoreError> {
        Err(unavailable())
    }

    async fn set(&self, _key: &str, _value: Bytes) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn increment(&self, _key: &str) -> Result<u64, StoreError> {
        Err(unavailable())
    }

    async fn compare_and_swap(
        &self,
        _key: &str,
        _expected: Option<&[u8]>,
        _value: Bytes,
    ) -> Result<bool, StoreError> {
        Err(unavailable())
    }

    async fn size(&self) -> Result<usize, StoreError> {
        Err(unavailable())
    }
}
