//! Test utilities for stayforge-store.
//!
//! Provides deterministic store doubles so fallback and failure paths can be
//! tested without network mocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::store_trait::TimedKeyValueStore;

/// A store whose every operation fails with a backend error.
///
/// Stands in for an unreachable durable backend; counts calls so tests can
/// assert the durable side was actually attempted.
#[derive(Debug, Default)]
pub struct FailingStore {
    calls: AtomicU64,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
        }
    }

    /// Number of operations attempted against this store.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn fail<T>(&self, op: &str) -> Result<T> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Err(StoreError::Backend(format!(
            "simulated backend outage during {}",
            op
        )))
    }
}

#[async_trait]
impl TimedKeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        self.fail("get")
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<()> {
        self.fail("set")
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        self.fail("delete")
    }

    async fn delete_older_than(&self, _prefix: &str, _cutoff_ms: i64) -> Result<u64> {
        self.fail("delete_older_than")
    }

    async fn flush_all(&self) -> Result<()> {
        self.fail("flush_all")
    }
}
