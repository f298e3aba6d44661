//! In-memory key-value store.
//!
//! The default backend for the server and the test suite. A single
//! `tokio::sync::RwLock` over a `HashMap` makes every operation indivisible,
//! which is exactly the atomicity the [`KeyValueStore`] contract asks of
//! `increment` and `compare_and_swap`. The map is unbounded; the system
//! performs no eviction or expiry.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::error::StoreError;

use super::KeyValueStore;

/// Unbounded in-memory implementation of [`KeyValueStore`].
///
/// # Example
///
/// ```
/// use pixelserve::store::{KeyValueStore, MemoryStore};
/// use bytes::Bytes;
///
/// #[tokio::main]
/// async fn main() {
///     let store = MemoryStore::new();
///     store.set("photo.jpg", Bytes::from_static(b"...")).await.unwrap();
///     assert!(store.get("photo.jpg").await.unwrap().is_some());
///     assert_eq!(store.increment("totalRequests").await.unwrap(), 1);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_counter(key: &str, raw: &[u8]) -> Result<u64, StoreError> {
    let text = std::str::from_utf8(raw).map_err(|_| StoreError::CorruptValue {
        key: key.to_string(),
        message: "counter is not valid UTF-8".to_string(),
    })?;
    text.trim().parse().map_err(|_| StoreError::CorruptValue {
        key: key.to_string(),
        message: format!("counter is not an integer: {text:?}"),
    })
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<u64, StoreError> {
        // Holding the write lock across read-add-write makes this atomic.
        let mut entries = self.entries.write().await;
        let current = match entries.get(key) {
            Some(raw) => parse_counter(key, raw)?,
            None => 0,
        };
        let next = current + 1;
        entries.insert(key.to_string(), Bytes::from(next.to_string()));
        Ok(next)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: Bytes,
    ) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        let matches = match (entries.get(key), expected) {
            (None, None) => true,
            (Some(current), Some(expected)) => current.as_ref() == expected,
            _ => false,
        };
        if matches {
            entries.insert(key.to_string(), value);
        }
        Ok(matches)
    }

    async fn size(&self) -> Result<usize, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.len())
    }
}
