//! Typed record access over the string-level store.
//!
//! Mirrors the split between the transport layer (untyped key/value) and the
//! record layer (typed, serde-backed): backends never know what they hold,
//! policies never touch raw JSON.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::store_trait::TimedKeyValueStore;

/// Typed get/put on any [`TimedKeyValueStore`], including trait objects.
///
/// Records are stored as JSON. A stored value that fails to deserialize is
/// surfaced as [`StoreError::Serialization`] rather than silently dropped,
/// since it indicates a record-shape mismatch between writers.
#[async_trait]
pub trait TypedStoreExt: TimedKeyValueStore {
    /// Fetch and deserialize the record under `key`.
    async fn get_record<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(raw) => {
                let record = serde_json::from_str(&raw).map_err(|e| {
                    StoreError::Serialization(format!(
                        "Failed to deserialize record under '{}': {}",
                        key, e
                    ))
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Serialize and store `record` under `key`.
    async fn put_record<T>(&self, key: &str, record: &T, ttl: Option<Duration>) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(record).map_err(|e| {
            StoreError::Serialization(format!(
                "Failed to serialize record for '{}': {}",
                key, e
            ))
        })?;
        self.set(key, &raw, ttl).await
    }
}

impl<S: TimedKeyValueStore + ?Sized> TypedStoreExt for S {}
