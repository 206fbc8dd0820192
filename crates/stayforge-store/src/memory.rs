//! In-process fallback store.
//!
//! A concurrent map that stands in for the durable backend when it is not
//! configured or not reachable. Entries expire lazily on read; the retention
//! sweeper bounds memory for keys that are never read again.
//!
//! One `InMemoryStore` is shared by every policy in the process; isolation
//! between policies is by key prefix, not by separate maps.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use stayforge_commons::now_millis;

use crate::error::Result;
use crate::store_trait::TimedKeyValueStore;

/// One stored value with its bookkeeping timestamps.
#[derive(Debug, Clone)]
struct StoredEntry {
    value: String,
    /// When the entry was last written (epoch millis); drives retention sweeps
    stored_at: i64,
    /// Absolute expiry (epoch millis); `None` = no TTL
    expires_at: Option<i64>,
}

impl StoredEntry {
    #[inline]
    fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// Concurrent in-process map with lazy TTL expiry.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, StoredEntry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of live entries, counting lazily-expired ones not yet dropped.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TimedKeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = now_millis();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired(now) {
                drop(entry);
                self.entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let now = now_millis();
        let entry = StoredEntry {
            value: value.to_string(),
            stored_at: now,
            expires_at: ttl.map(|t| now + t.as_millis() as i64),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn delete_older_than(&self, prefix: &str, cutoff_ms: i64) -> Result<u64> {
        let now = now_millis();
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            if !key.starts_with(prefix) {
                return true;
            }
            entry.stored_at >= cutoff_ms && !entry.is_expired(now)
        });
        Ok((before - self.entries.len()) as u64)
    }

    async fn flush_all(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
