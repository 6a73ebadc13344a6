//! # Key-Value Store
//!
//! The storage seam the cart talks to. It mirrors the device storage API the
//! storefront has always used: string keys, string values, every call async
//! and fallible.

use async_trait::async_trait;

use crate::error::StorageResult;

/// Async string key-value storage.
///
/// Implementations must be shareable across tasks (`Arc<dyn KeyValueStore>`).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if the key was never set.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}
