//! Axum-based HTTP server: routes, handlers and request validation.
//!
//! The server layer is a thin shell over [`ImagePipeline`]: it validates
//! request syntax, invokes the pipeline, and maps results and errors onto
//! HTTP responses.
//!
//! [`ImagePipeline`]: crate::pipeline::ImagePipeline

mod handlers;
mod routes;
mod validate;

pub use handlers::{
    health_handler, image_handler, statistics_handler, AppState, HealthResponse, ImageQueryParams,
    StatisticsResponse, TOP_N,
};
pub use routes::{create_router, RouterConfig};
pub use validate::{validate_request, ValidationError, ValidationErrors};
