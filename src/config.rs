//! Configuration management.
//!
//! Command-line arguments via clap, with environment-variable fallbacks
//! under the `PIXELSERVE_` prefix and sensible defaults for everything
//! optional.
//!
//! # Environment Variables
//!
//! - `PIXELSERVE_HOST` - Server bind address (default: 0.0.0.0)
//! - `PIXELSERVE_PORT` - Server port (default: 3000)
//! - `PIXELSERVE_IMAGES_DIR` - Directory holding the original images
//! - `PIXELSERVE_CORS_ORIGINS` - Allowed CORS origins (comma-separated)

use std::path::PathBuf;

use clap::Parser;

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default image directory.
pub const DEFAULT_IMAGES_DIR: &str = "images";

/// Pixelserve - an image server with on-demand resizing and cached variants.
///
/// Serves images from a local directory, resizes on request, and keeps both
/// originals and resized variants plus live usage statistics in a shared
/// key-value store.
#[derive(Parser, Debug, Clone)]
#[command(name = "pixelserve")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "PIXELSERVE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PIXELSERVE_PORT")]
    pub port: u16,

    /// Directory containing the original image files.
    #[arg(long, default_value = DEFAULT_IMAGES_DIR, env = "PIXELSERVE_IMAGES_DIR")]
    pub images_dir: PathBuf,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "PIXELSERVE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.images_dir.as_os_str().is_empty() {
            return Err(
                "Image directory is required. Set --images-dir or PIXELSERVE_IMAGES_DIR"
                    .to_string(),
            );
        }
        if !self.images_dir.is_dir() {
            return Err(format!(
                "Image directory '{}' does not exist or is not a directory",
                self.images_dir.display()
            ));
        }
        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
