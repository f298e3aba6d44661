//! Statistics endpoint tests: counters, ratios, top-N maps, formatting.

use pixelserve::FrequencyMap;

use super::test_utils::{get, sample_jpeg, service_with_images, statistics, SEEDED_STATS_KEYS};

/// Partial view of the statistics report keeping frequency-map entry order.
#[derive(serde::Deserialize)]
struct TopMaps {
    #[serde(rename = "mostRequestedResolutions")]
    resolutions: FrequencyMap,

    #[serde(rename = "mostRequestedImages")]
    images: FrequencyMap,
}

async fn top_maps(router: &axum::Router) -> TopMaps {
    let (_, body) = get(router, "/api/statistics").await;
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Fresh Store
// =============================================================================

#[tokio::test]
async fn test_fresh_store_statistics() {
    let service = service_with_images(&[("photo.jpg", sample_jpeg(8, 8))]).await;

    let stats = statistics(&service.router).await;

    assert_eq!(stats["totalImages"], 1);
    assert_eq!(stats["resizedImages"], 0);
    assert_eq!(stats["cacheHits"], 0);
    assert_eq!(stats["cacheMisses"], 0);
    assert_eq!(stats["totalRequests"], 0);
    assert_eq!(stats["totalErrors"], 0);
    assert_eq!(stats["averageProcessingTime"], "0.00 ms");
    assert_eq!(stats["cacheHitMissRatio"], "N/A");
    assert_eq!(stats["requestSuccessErrorRatio"], "N/A");
    assert_eq!(stats["cacheSize"], SEEDED_STATS_KEYS);
    assert_eq!(
        stats["mostRequestedResolutions"],
        serde_json::json!({}),
        "fresh resolution map must be empty"
    );
    assert_eq!(stats["mostRequestedImages"], serde_json::json!({}));
}

// =============================================================================
// Ratios
// =============================================================================

#[tokio::test]
async fn test_hit_miss_ratio() {
    let service = service_with_images(&[("photo.jpg", sample_jpeg(8, 8))]).await;

    // One miss, then three hits
    for _ in 0..4 {
        get(&service.router, "/api/images/photo.jpg").await;
    }

    let stats = statistics(&service.router).await;
    assert_eq!(stats["cacheHits"], 3);
    assert_eq!(stats["cacheMisses"], 1);
    assert_eq!(stats["cacheHitMissRatio"], "3.00");
}

#[tokio::test]
async fn test_hit_miss_ratio_fractional() {
    let service = service_with_images(&[
        ("a.jpg", sample_jpeg(8, 8)),
        ("b.jpg", sample_jpeg(8, 8)),
        ("c.jpg", sample_jpeg(8, 8)),
    ])
    .await;

    // Three misses, one hit
    get(&service.router, "/api/images/a.jpg").await;
    get(&service.router, "/api/images/b.jpg").await;
    get(&service.router, "/api/images/c.jpg").await;
    get(&service.router, "/api/images/a.jpg").await;

    let stats = statistics(&service.router).await;
    assert_eq!(stats["cacheHitMissRatio"], "0.33");
}

#[tokio::test]
async fn test_success_error_ratio() {
    let service = service_with_images(&[("photo.jpg", sample_jpeg(8, 8))]).await;

    // Two successful requests, one not-found error
    get(&service.router, "/api/images/photo.jpg").await;
    get(&service.router, "/api/images/photo.jpg").await;
    get(&service.router, "/api/images/missing.jpg").await;

    let stats = statistics(&service.router).await;
    assert_eq!(stats["totalRequests"], 2);
    assert_eq!(stats["totalErrors"], 1);
    // (2 - 1) / 1
    assert_eq!(stats["requestSuccessErrorRatio"], "1.00");
}

#[tokio::test]
async fn test_error_ratio_na_without_errors() {
    let service = service_with_images(&[("photo.jpg", sample_jpeg(8, 8))]).await;
    get(&service.router, "/api/images/photo.jpg").await;

    let stats = statistics(&service.router).await;
    assert_eq!(stats["requestSuccessErrorRatio"], "N/A");
    // A miss happened, so the hit/miss ratio is defined (and zero)
    assert_eq!(stats["cacheHitMissRatio"], "0.00");
}

// =============================================================================
// Top-N Maps
// =============================================================================

#[tokio::test]
async fn test_top3_truncation_and_order() {
    let service = service_with_images(&[("photo.jpg", sample_jpeg(64, 64))]).await;

    let requests = [
        ("10x10", 3),
        ("20x20", 2),
        ("30x30", 1),
        ("40x40", 1),
    ];
    for (resolution, times) in requests {
        for _ in 0..times {
            let uri = format!("/api/images/photo.jpg?resolution={resolution}");
            get(&service.router, &uri).await;
        }
    }

    let maps = top_maps(&service.router).await;
    let entries: Vec<_> = maps
        .resolutions
        .iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();

    // Top 3 of 4 distinct resolutions, descending; the 1-count tie between
    // 30x30 and 40x40 resolves to the first-seen label
    assert_eq!(
        entries,
        vec![
            ("10x10".to_string(), 3),
            ("20x20".to_string(), 2),
            ("30x30".to_string(), 1),
        ]
    );
}

#[tokio::test]
async fn test_most_requested_images_order() {
    let service = service_with_images(&[
        ("rare.jpg", sample_jpeg(8, 8)),
        ("popular.jpg", sample_jpeg(8, 8)),
    ])
    .await;

    get(&service.router, "/api/images/rare.jpg").await;
    for _ in 0..3 {
        get(&service.router, "/api/images/popular.jpg").await;
    }

    let maps = top_maps(&service.router).await;
    let entries: Vec<_> = maps
        .images
        .iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    assert_eq!(
        entries,
        vec![("popular.jpg".to_string(), 3), ("rare.jpg".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_original_label_in_resolution_map() {
    let service = service_with_images(&[("photo.jpg", sample_jpeg(8, 8))]).await;

    // Miss does not bump the resolution map without a resize; the hit
    // records the "original" label
    get(&service.router, "/api/images/photo.jpg").await;
    get(&service.router, "/api/images/photo.jpg").await;

    let stats = statistics(&service.router).await;
    assert_eq!(stats["mostRequestedResolutions"]["original"], 1);
}

// =============================================================================
// Report Fields
// =============================================================================

#[tokio::test]
async fn test_total_images_counts_directory_not_requests() {
    let service = service_with_images(&[
        ("a.jpg", sample_jpeg(8, 8)),
        ("b.jpg", sample_jpeg(8, 8)),
        ("never-requested.png", sample_jpeg(8, 8)),
    ])
    .await;

    let stats = statistics(&service.router).await;
    assert_eq!(stats["totalImages"], 3);
}

#[tokio::test]
async fn test_cache_size_grows_with_cached_variants() {
    let service = service_with_images(&[("photo.jpg", sample_jpeg(64, 64))]).await;

    get(&service.router, "/api/images/photo.jpg").await;
    get(&service.router, "/api/images/photo.jpg?resolution=10x10").await;

    let stats = statistics(&service.router).await;
    // Statistics keys plus two cached payloads
    assert_eq!(stats["cacheSize"], (SEEDED_STATS_KEYS + 2) as i64);
}

#[tokio::test]
async fn test_average_processing_time_format() {
    let service = service_with_images(&[("photo.jpg", sample_jpeg(64, 64))]).await;

    get(&service.router, "/api/images/photo.jpg?resolution=32x32").await;

    let stats = statistics(&service.router).await;
    let formatted = stats["averageProcessingTime"].as_str().unwrap();
    let value = formatted.strip_suffix(" ms").unwrap();
    assert!(value.parse::<f64>().unwrap() >= 0.0);
    // Exactly two decimal places
    assert_eq!(value.split('.').nth(1).unwrap().len(), 2);
}
