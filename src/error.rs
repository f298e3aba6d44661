use thiserror::Error;

/// Errors from the shared key-value store backing the cache and statistics.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store is unreachable or returned a backend failure
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A value exists but cannot be interpreted (e.g. a counter that is not
    /// a decimal integer, or a frequency map that is not a JSON object)
    #[error("corrupt value at key '{key}': {message}")]
    CorruptValue { key: String, message: String },
}

/// Errors from the directory-backed image store.
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// The named image does not exist in the backing directory
    #[error("image not found: {0}")]
    NotFound(String),

    /// Filesystem error while reading an image or listing the directory
    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },
}

/// Errors from the resize primitive.
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// The source bytes could not be decoded as an image
    #[error("failed to decode image: {message}")]
    Decode { message: String },

    /// The resized image could not be re-encoded
    #[error("failed to encode image: {message}")]
    Encode { message: String },
}

/// Errors surfaced by the request pipeline.
///
/// These map directly onto the HTTP surface: `NotFound` becomes a 404,
/// everything else a 500 processing failure.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// The requested image is absent from the backing store
    #[error("image not found: {filename}")]
    NotFound { filename: String },

    /// The resize primitive rejected the input or failed
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// The key-value store failed on the hot path (get/set/increment)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Filesystem failure while loading original bytes
    #[error(transparent)]
    Image(#[from] ImageError),
}
