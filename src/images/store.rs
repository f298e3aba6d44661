//! Directory-backed image store.
//!
//! Original images live as plain files in a configured directory. The store
//! reports existence, reads whole files, and counts the directory's entries
//! for the `totalImages` statistic.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::ImageError;

/// Reads original image bytes from a named-file backing directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The backing directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Whether the named image exists in the backing directory.
    pub async fn exists(&self, filename: &str) -> bool {
        tokio::fs::metadata(self.path_for(filename))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    /// Read the full contents of the named image.
    pub async fn read(&self, filename: &str) -> Result<Bytes, ImageError> {
        let path = self.path_for(filename);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ImageError::NotFound(filename.to_string()))
            }
            Err(err) => Err(ImageError::Io {
                path: path.display().to_string(),
                message: err.to_string(),
            }),
        }
    }

    /// Count the files in the backing directory.
    pub async fn count(&self) -> Result<usize, ImageError> {
        let mut dir = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|err| ImageError::Io {
                path: self.root.display().to_string(),
                message: err.to_string(),
            })?;

        let mut count = 0;
        while let Some(entry) = dir.next_entry().await.map_err(|err| ImageError::Io {
            path: self.root.display().to_string(),
            message: err.to_string(),
        })? {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file {
                count += 1;
            }
        }
        Ok(count)
    }
}
