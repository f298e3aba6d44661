//! HTTP request handlers.
//!
//! # Endpoints
//!
//! - `GET /api/images/{filename}?resolution={W}x{H}` - Serve an image,
//!   resizing on demand
//! - `GET /api/statistics` - Live usage statistics
//! - `GET /health` - Health check

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::PipelineError;
use crate::pipeline::ImagePipeline;
use crate::stats::{format_average_ms, format_ratio, FrequencyMap};
use crate::store::KeyValueStore;

use super::validate::validate_request;

/// Number of entries reported per frequency map.
pub const TOP_N: usize = 3;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state, passed to handlers via Axum's State extractor.
pub struct AppState<S: KeyValueStore> {
    /// The pipeline handling image requests
    pub pipeline: Arc<ImagePipeline<S>>,
}

impl<S: KeyValueStore> AppState<S> {
    /// Create state around the given pipeline.
    pub fn new(pipeline: ImagePipeline<S>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

impl<S: KeyValueStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for image requests.
#[derive(Debug, Deserialize)]
pub struct ImageQueryParams {
    /// Desired resolution in `{width}x{height}` format
    #[serde(default)]
    pub resolution: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// The statistics report served by `GET /api/statistics`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    /// Count of files in the backing image directory
    pub total_images: usize,

    pub resized_images: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_requests: u64,
    pub total_errors: u64,

    /// Running average of miss-path processing time, e.g. `"150.00 ms"`
    pub average_processing_time: String,

    /// Top-3 requested resolution labels
    pub most_requested_resolutions: FrequencyMap,

    /// Top-3 requested filenames
    pub most_requested_images: FrequencyMap,

    /// Total key count in the store, statistics keys included
    pub cache_size: usize,

    /// `cacheHits / cacheMisses`, 2 decimals, or `"N/A"` when misses are 0
    pub cache_hit_miss_ratio: String,

    /// `(totalRequests - totalErrors) / totalErrors`, 2 decimals, or `"N/A"`
    /// when errors are 0
    pub request_success_error_ratio: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Map pipeline errors to the HTTP surface.
///
/// Client-visible bodies are deliberately terse; details go to the log.
impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        match &self {
            PipelineError::NotFound { filename } => {
                warn!(%filename, "404: image not found");
                (StatusCode::NOT_FOUND, "Image not found!").into_response()
            }
            other => {
                error!(error = %other, "500: request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error processing image!").into_response()
            }
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handler for `GET /api/images/{filename}`.
pub async fn image_handler<S: KeyValueStore>(
    State(state): State<AppState<S>>,
    Path(filename): Path<String>,
    Query(params): Query<ImageQueryParams>,
) -> Response {
    let resolution = match validate_request(&filename, params.resolution.as_deref()) {
        Ok(resolution) => resolution,
        Err(errors) => {
            warn!(%filename, "400: invalid request parameters");
            return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
        }
    };

    match state.pipeline.fetch(&filename, resolution).await {
        Ok(image) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, image.content_type)],
            image.data,
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

/// Handler for `GET /api/statistics`.
pub async fn statistics_handler<S: KeyValueStore>(
    State(state): State<AppState<S>>,
) -> Response {
    match build_statistics(&state).await {
        Ok(report) => Json(report).into_response(),
        Err(message) => {
            error!(error = %message, "500: statistics unavailable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error retrieving statistics!",
            )
                .into_response()
        }
    }
}

async fn build_statistics<S: KeyValueStore>(
    state: &AppState<S>,
) -> Result<StatisticsResponse, String> {
    let pipeline = &state.pipeline;

    // totalImages comes from the image directory listing, not from the store
    let total_images = pipeline
        .images()
        .count()
        .await
        .map_err(|e| e.to_string())?;
    let snapshot = pipeline.stats().snapshot().await.map_err(|e| e.to_string())?;
    let cache_size = pipeline.store().size().await.map_err(|e| e.to_string())?;

    let successes = snapshot.total_requests as f64 - snapshot.total_errors as f64;

    Ok(StatisticsResponse {
        total_images,
        resized_images: snapshot.resized_images,
        cache_hits: snapshot.cache_hits,
        cache_misses: snapshot.cache_misses,
        total_requests: snapshot.total_requests,
        total_errors: snapshot.total_errors,
        average_processing_time: format_average_ms(snapshot.average_processing_time_ms),
        most_requested_resolutions: snapshot.most_requested_resolutions.top_n(TOP_N),
        most_requested_images: snapshot.most_requested_images.top_n(TOP_N),
        cache_size,
        cache_hit_miss_ratio: format_ratio(snapshot.cache_hits as f64, snapshot.cache_misses),
        request_success_error_ratio: format_ratio(successes, snapshot.total_errors),
    })
}

/// Handler for `GET /health`.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
