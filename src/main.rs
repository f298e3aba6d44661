//! Pixelserve - an image server with on-demand resizing and live statistics.
//!
//! This binary starts the HTTP server and wires up all components.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixelserve::{
    config::Config, create_router, ImagePipeline, ImageStore, MemoryStore, RouterConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Configuration:");
    info!("  Image directory: {}", config.images_dir.display());

    // Probe the image directory up front so a bad path fails fast
    let images = ImageStore::new(&config.images_dir);
    match images.count().await {
        Ok(count) => info!("  Found {} image(s)", count),
        Err(e) => {
            error!("  Failed to read image directory: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let store = Arc::new(MemoryStore::new());
    let pipeline = ImagePipeline::new(store, images);

    // Seed absent statistics keys so a fresh store reports zeroes
    if let Err(e) = pipeline.stats().initialize().await {
        error!("Failed to initialize statistics: {}", e);
        return ExitCode::FAILURE;
    }

    let mut router_config = RouterConfig::new().with_tracing(!config.no_tracing);
    if let Some(origins) = config.cors_origins.clone() {
        router_config = router_config.with_cors_origins(origins);
    }

    let router = create_router(pipeline, router_config);

    let addr = config.bind_address();
    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/api/statistics", addr);
    info!("    curl http://{}/api/images/<filename>?resolution=800x600", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "pixelserve=debug,tower_http=debug"
    } else {
        "pixelserve=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
