//! # Pixelserve
//!
//! An HTTP image server with on-demand resizing, key-value caching and live
//! usage statistics.
//!
//! Originals and resized variants are cached in a shared key-value store
//! behind keys derived from the filename and requested resolution. The same
//! store holds the service's usage statistics: hit/miss counters, error
//! counts, a running average of processing time and two "most requested"
//! popularity maps, exposed by a read-only statistics endpoint.
//!
//! ## Architecture
//!
//! - [`store`] - Key-value store trait and the in-memory implementation
//! - [`images`] - Directory-backed image loading and the resize primitive
//! - [`stats`] - Statistics engine: counters, running average, top-N maps
//! - [`pipeline`] - Request orchestration: hit/miss, resize, populate, record
//! - [`server`] - Axum-based HTTP routes, handlers and validation
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pixelserve::{create_router, ImagePipeline, ImageStore, MemoryStore, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryStore::new());
//!     let pipeline = ImagePipeline::new(store, ImageStore::new("images"));
//!     pipeline.stats().initialize().await.unwrap();
//!
//!     let router = create_router(pipeline, RouterConfig::new());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod images;
pub mod pipeline;
pub mod server;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{ImageError, PipelineError, StoreError, TransformError};
pub use images::{ImageKind, ImageStore, Resizer, Resolution};
pub use pipeline::{ImagePipeline, ImageResponse};
pub use server::{create_router, AppState, RouterConfig, StatisticsResponse};
pub use stats::{FrequencyMap, StatisticsEngine, StatisticsSnapshot};
pub use store::{KeyValueStore, MemoryStore};
