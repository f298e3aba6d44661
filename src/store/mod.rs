//! Key-value store abstraction.
//!
//! The store is the single shared mutable resource in the system: image
//! payloads, counters, the running average and the frequency maps all live
//! here. Components receive the store as an explicitly constructed, injected
//! dependency, which keeps the production backend substitutable with the
//! in-memory implementation used by the binary and by tests.
//!
//! # Contract
//!
//! - `get` never fails on a missing key; absence is a normal outcome
//! - `set` overwrites unconditionally (last-writer-wins, no versioning)
//! - `increment` is atomic: concurrent callers never lose an update
//! - `compare_and_swap` supports lock-free read-modify-write loops for
//!   whole-value updates (frequency maps, running average)
//! - `size` counts every key, statistics keys included

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

/// Shared key-value store holding cached payloads and statistics state.
///
/// Implementations must be safe to share across concurrent request handlers.
/// `increment` is the correctness-critical operation: it must be indivisible
/// so that counters never lose updates under load.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the payload at `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError>;

    /// Store `value` at `key`, overwriting any existing payload.
    async fn set(&self, key: &str, value: Bytes) -> Result<(), StoreError>;

    /// Atomically add 1 to the integer at `key` and return the new value.
    ///
    /// A missing key is treated as 0, so the first increment yields 1.
    /// Returns [`StoreError::CorruptValue`] if an existing value is not an
    /// ASCII decimal integer.
    async fn increment(&self, key: &str) -> Result<u64, StoreError>;

    /// Replace the value at `key` with `value` only if the current value
    /// equals `expected` (`None` meaning the key must be absent).
    ///
    /// Returns `true` if the swap happened, `false` if the current value no
    /// longer matched and the caller should retry.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: Bytes,
    ) -> Result<bool, StoreError>;

    /// Number of keys currently held, image payloads and statistics keys
    /// alike.
    async fn size(&self) -> Result<usize, StoreError>;
}
