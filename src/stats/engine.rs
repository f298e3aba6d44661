//! Statistics aggregation engine.
//!
//! All statistics state lives in the shared key-value store; the engine holds
//! no authoritative in-memory copy, so every read and update round-trips
//! through the store. Counters use the store's atomic increment. The running
//! average and the frequency maps are whole-value read-modify-write updates
//! and go through a compare-and-swap loop: an update that loses a race
//! re-reads the latest snapshot and retries, so no increment or sample is
//! dropped under concurrent load.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::error::StoreError;
use crate::store::KeyValueStore;

use super::frequency::FrequencyMap;

/// Store keys for the statistics state.
pub mod keys {
    /// Count of resize operations actually performed.
    pub const RESIZED_IMAGES: &str = "resizedImages";
    /// Count of cache lookups that found a payload.
    pub const CACHE_HITS: &str = "cacheHits";
    /// Count of cache lookups that found nothing (and not-found requests).
    pub const CACHE_MISSES: &str = "cacheMisses";
    /// Count of completed requests (hits plus successful misses).
    pub const TOTAL_REQUESTS: &str = "totalRequests";
    /// Count of failed requests (not-found plus transform failures).
    pub const TOTAL_ERRORS: &str = "totalErrors";
    /// Running mean of miss-path processing time, milliseconds.
    pub const AVERAGE_PROCESSING_TIME: &str = "averageProcessingTime";
    /// Frequency map of requested resolution labels.
    pub const MOST_REQUESTED_RESOLUTIONS: &str = "mostRequestedResolutions";
    /// Frequency map of requested filenames.
    pub const MOST_REQUESTED_IMAGES: &str = "mostRequestedImages";

    /// Scalar keys initialized to `0` at boot.
    pub const SCALARS: [&str; 6] = [
        RESIZED_IMAGES,
        CACHE_HITS,
        CACHE_MISSES,
        TOTAL_REQUESTS,
        TOTAL_ERRORS,
        AVERAGE_PROCESSING_TIME,
    ];

    /// Map keys initialized to `{}` at boot.
    pub const MAPS: [&str; 2] = [MOST_REQUESTED_RESOLUTIONS, MOST_REQUESTED_IMAGES];
}

/// Resolution label recorded when no resolution was requested.
pub const ORIGINAL_LABEL: &str = "original";

// =============================================================================
// Snapshot
// =============================================================================

/// A best-effort read of all statistics state.
///
/// Field reads are not atomic relative to each other; a snapshot taken while
/// requests are in flight may mix values from slightly different moments.
#[derive(Debug, Clone)]
pub struct StatisticsSnapshot {
    pub resized_images: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_requests: u64,
    pub total_errors: u64,
    /// Mean miss-path processing time in milliseconds
    pub average_processing_time_ms: f64,
    pub most_requested_resolutions: FrequencyMap,
    pub most_requested_images: FrequencyMap,
}

// =============================================================================
// Engine
// =============================================================================

/// Maintains the service's usage statistics in the key-value store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use pixelserve::stats::StatisticsEngine;
/// use pixelserve::store::MemoryStore;
///
/// #[tokio::main]
/// async fn main() {
///     let store = Arc::new(MemoryStore::new());
///     let stats = StatisticsEngine::new(store);
///     stats.initialize().await.unwrap();
///
///     stats.record_hit("800x600", "photo.jpg").await.unwrap();
///     let snapshot = stats.snapshot().await.unwrap();
///     assert_eq!(snapshot.cache_hits, 1);
///     assert_eq!(snapshot.total_requests, 1);
/// }
/// ```
pub struct StatisticsEngine<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> StatisticsEngine<S> {
    /// Create an engine over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Initialize absent statistics keys: scalars to `0`, maps to `{}`.
    ///
    /// Existing values are left untouched, so statistics survive process
    /// restarts for as long as the backing store does.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        for key in keys::SCALARS {
            self.store
                .compare_and_swap(key, None, Bytes::from_static(b"0"))
                .await?;
        }
        for key in keys::MAPS {
            self.store
                .compare_and_swap(key, None, Bytes::from_static(b"{}"))
                .await?;
        }
        Ok(())
    }

    /// Record a cache hit: bumps `cacheHits`, `totalRequests` and both
    /// frequency maps.
    pub async fn record_hit(
        &self,
        resolution_label: &str,
        filename: &str,
    ) -> Result<(), StoreError> {
        self.store.increment(keys::CACHE_HITS).await?;
        self.store.increment(keys::TOTAL_REQUESTS).await?;
        self.bump_frequency(keys::MOST_REQUESTED_RESOLUTIONS, resolution_label)
            .await?;
        self.bump_frequency(keys::MOST_REQUESTED_IMAGES, filename)
            .await?;
        Ok(())
    }

    /// Record a cache miss.
    pub async fn record_miss(&self) -> Result<(), StoreError> {
        self.store.increment(keys::CACHE_MISSES).await?;
        Ok(())
    }

    /// Record that a resize operation was actually performed.
    pub async fn record_resize(&self) -> Result<(), StoreError> {
        self.store.increment(keys::RESIZED_IMAGES).await?;
        Ok(())
    }

    /// Record a failed request.
    pub async fn record_error(&self) -> Result<(), StoreError> {
        self.store.increment(keys::TOTAL_ERRORS).await?;
        Ok(())
    }

    /// Record a completed request (the `totalRequests` increment of the miss
    /// path; the hit path increments through [`record_hit`]).
    ///
    /// [`record_hit`]: StatisticsEngine::record_hit
    pub async fn record_request(&self) -> Result<u64, StoreError> {
        self.store.increment(keys::TOTAL_REQUESTS).await
    }

    /// Fold a processing-time sample into the running average.
    ///
    /// The sample count is `totalRequests` as read *before* the current
    /// request's own increment, so callers must invoke this ahead of
    /// [`record_request`](StatisticsEngine::record_request). The update runs
    /// in a compare-and-swap loop keyed on the stored average.
    pub async fn record_processing_time(&self, elapsed_ms: f64) -> Result<(), StoreError> {
        loop {
            let current = self.store.get(keys::AVERAGE_PROCESSING_TIME).await?;
            let old_average = match &current {
                Some(raw) => parse_float(keys::AVERAGE_PROCESSING_TIME, raw)?,
                None => 0.0,
            };
            let prior_count = self.counter(keys::TOTAL_REQUESTS).await? as f64;
            let new_average = (old_average * prior_count + elapsed_ms) / (prior_count + 1.0);

            let swapped = self
                .store
                .compare_and_swap(
                    keys::AVERAGE_PROCESSING_TIME,
                    current.as_deref(),
                    Bytes::from(new_average.to_string()),
                )
                .await?;
            if swapped {
                return Ok(());
            }
            debug!(key = keys::AVERAGE_PROCESSING_TIME, "lost CAS race, retrying");
        }
    }

    /// Bump the resolution frequency map.
    pub async fn bump_resolution(&self, label: &str) -> Result<(), StoreError> {
        self.bump_frequency(keys::MOST_REQUESTED_RESOLUTIONS, label)
            .await
    }

    /// Bump the image frequency map.
    pub async fn bump_image(&self, filename: &str) -> Result<(), StoreError> {
        self.bump_frequency(keys::MOST_REQUESTED_IMAGES, filename)
            .await
    }

    /// Read a counter, treating an absent key as 0.
    pub async fn counter(&self, key: &str) -> Result<u64, StoreError> {
        match self.store.get(key).await? {
            Some(raw) => parse_integer(key, &raw),
            None => Ok(0),
        }
    }

    /// Read a frequency map, treating an absent key as empty.
    pub async fn frequency_map(&self, key: &str) -> Result<FrequencyMap, StoreError> {
        match self.store.get(key).await? {
            Some(raw) => FrequencyMap::from_json(&raw).map_err(|e| StoreError::CorruptValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
            None => Ok(FrequencyMap::new()),
        }
    }

    /// Read all counters, the average and both maps in one logical call.
    pub async fn snapshot(&self) -> Result<StatisticsSnapshot, StoreError> {
        let average_processing_time_ms = match self.store.get(keys::AVERAGE_PROCESSING_TIME).await?
        {
            Some(raw) => parse_float(keys::AVERAGE_PROCESSING_TIME, &raw)?,
            None => 0.0,
        };

        Ok(StatisticsSnapshot {
            resized_images: self.counter(keys::RESIZED_IMAGES).await?,
            cache_hits: self.counter(keys::CACHE_HITS).await?,
            cache_misses: self.counter(keys::CACHE_MISSES).await?,
            total_requests: self.counter(keys::TOTAL_REQUESTS).await?,
            total_errors: self.counter(keys::TOTAL_ERRORS).await?,
            average_processing_time_ms,
            most_requested_resolutions: self
                .frequency_map(keys::MOST_REQUESTED_RESOLUTIONS)
                .await?,
            most_requested_images: self.frequency_map(keys::MOST_REQUESTED_IMAGES).await?,
        })
    }

    /// Read-modify-write of a frequency map through a CAS loop.
    async fn bump_frequency(&self, key: &str, label: &str) -> Result<(), StoreError> {
        loop {
            let current = self.store.get(key).await?;
            let mut map = match &current {
                Some(raw) => FrequencyMap::from_json(raw).map_err(|e| StoreError::CorruptValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })?,
                None => FrequencyMap::new(),
            };
            map.bump(label);

            let swapped = self
                .store
                .compare_and_swap(key, current.as_deref(), Bytes::from(map.to_json()))
                .await?;
            if swapped {
                return Ok(());
            }
            debug!(key, label, "lost CAS race, retrying");
        }
    }
}

impl<S: KeyValueStore> Clone for StatisticsEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Format the running average for reporting, e.g. `"150.00 ms"`.
pub fn format_average_ms(average_ms: f64) -> String {
    format!("{average_ms:.2} ms")
}

/// Format a ratio to two decimals, or `"N/A"` when the denominator is 0.
pub fn format_ratio(numerator: f64, denominator: u64) -> String {
    if denominator == 0 {
        "N/A".to_string()
    } else {
        format!("{:.2}", numerator / denominator as f64)
    }
}

fn parse_integer(key: &str, raw: &[u8]) -> Result<u64, StoreError> {
    let text = std::str::from_utf8(raw).map_err(|_| StoreError::CorruptValue {
        key: key.to_string(),
        message: "value is not valid UTF-8".to_string(),
    })?;
    text.trim().parse().map_err(|_| StoreError::CorruptValue {
        key: key.to_string(),
        message: format!("expected an integer, got {text:?}"),
    })
}

fn parse_float(key: &str, raw: &[u8]) -> Result<f64, StoreError> {
    let text = std::str::from_utf8(raw).map_err(|_| StoreError::CorruptValue {
        key: key.to_string(),
        message: "value is not valid UTF-8".to_string(),
    })?;
    text.trim().parse().map_err(|_| StoreError::CorruptValue {
        key: key.to_string(),
        message: format!("expected a number, got {text:?}"),
    })
}

// =============================================================================
// Tests
// =============================================================================
