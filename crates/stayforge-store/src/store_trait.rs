//! Keyed, TTL-aware record store abstraction.
//!
//! This module provides the trait all store backends implement:
//! - **`DurableStore`**: a REST key-value service reachable over the network
//! - **`InMemoryStore`**: an in-process concurrent map
//! - **`FallbackStore`**: durable-first composition of the two
//!
//! ## Key Namespacing
//!
//! The store is a single flat keyspace. Policies isolate themselves by key
//! prefix (`login:…`, `webhook:…`), not by separate physical maps: multiple
//! guard instances with different prefixes may share one store and never
//! observe each other's records.
//!
//! ## TTL Model
//!
//! `set` accepts an optional time-to-live. The durable backend enforces TTL
//! natively, so expiry is self-cleaning on that side. The in-process map
//! expires lazily on read and relies on the retention sweeper
//! ([`crate::sweeper::RetentionSweeper`]) to bound memory between reads.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Backend-agnostic keyed record store with TTL support.
///
/// Values are stored as strings; the typed layer in [`crate::records`]
/// handles JSON (de)serialization on top of this trait.
#[async_trait]
pub trait TimedKeyValueStore: Send + Sync {
    /// Fetch the value for `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, overwriting any previous value.
    ///
    /// With `ttl` set, the entry expires after the given duration.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Remove the entry for `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Bulk-remove entries under `prefix` stored before `cutoff_ms`.
    ///
    /// Returns the number of entries removed. Backends with native TTL
    /// expiry may return 0 and let TTL do the work.
    async fn delete_older_than(&self, prefix: &str, cutoff_ms: i64) -> Result<u64>;

    /// Remove every entry. Test and operational tooling only.
    async fn flush_all(&self) -> Result<()>;
}
