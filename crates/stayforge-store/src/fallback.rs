//! Durable-first store with transparent in-process fallback.
//!
//! Every operation is tried against the durable backend when one is
//! configured; a backend error or timeout is logged and the same operation
//! runs against the in-process map instead. Callers never observe the
//! backend failure; they observe whichever backend actually holds the data.
//!
//! Trade-off carried by this design: when the durable backend becomes
//! unreachable mid-window, a policy's effective state silently resets to
//! whatever the local map holds, and separate processes fall back to
//! independent maps that can diverge until the backend recovers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use stayforge_commons::StoreSettings;

use crate::durable::DurableStore;
use crate::error::Result;
use crate::memory::InMemoryStore;
use crate::store_trait::TimedKeyValueStore;

/// Durable-then-memory composition of two stores.
pub struct FallbackStore {
    durable: Option<Arc<dyn TimedKeyValueStore>>,
    memory: Arc<InMemoryStore>,
}

impl FallbackStore {
    /// Compose an optional durable backend with an in-process map.
    ///
    /// The durable side is injected as a trait object so tests can swap in
    /// a deterministic failing double instead of mocking the network.
    pub fn new(durable: Option<Arc<dyn TimedKeyValueStore>>, memory: Arc<InMemoryStore>) -> Self {
        Self { durable, memory }
    }

    /// Build from settings: durable client when an endpoint is configured,
    /// memory-only otherwise. A client construction failure is logged and
    /// degrades to memory-only rather than refusing to start.
    pub fn from_settings(settings: &StoreSettings) -> Self {
        let memory = Arc::new(InMemoryStore::new());

        let durable: Option<Arc<dyn TimedKeyValueStore>> = match settings.durable_url {
            Some(ref url) => {
                let timeout = Duration::from_secs(settings.request_timeout_seconds);
                match DurableStore::new(url.clone(), settings.durable_token.clone(), timeout) {
                    Ok(store) => {
                        log::info!("Durable key-value backend configured at {}", url);
                        Some(Arc::new(store))
                    }
                    Err(e) => {
                        log::error!(
                            "Failed to construct durable store client, running memory-only: {}",
                            e
                        );
                        None
                    }
                }
            }
            None => {
                log::info!("No durable key-value backend configured, running memory-only");
                None
            }
        };

        Self { durable, memory }
    }

    /// The in-process map shared by every policy on this store.
    pub fn memory(&self) -> &Arc<InMemoryStore> {
        &self.memory
    }
}

#[async_trait]
impl TimedKeyValueStore for FallbackStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(ref durable) = self.durable {
            match durable.get(key).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    log::error!("Durable get for '{}' failed, using memory fallback: {}", key, e);
                }
            }
        }
        self.memory.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        if let Some(ref durable) = self.durable {
            match durable.set(key, value, ttl).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    log::error!("Durable set for '{}' failed, using memory fallback: {}", key, e);
                }
            }
        }
        self.memory.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if let Some(ref durable) = self.durable {
            match durable.delete(key).await {
                Ok(()) => {
                    // Also clear any locally-held copy from an earlier outage
                    return self.memory.delete(key).await;
                }
                Err(e) => {
                    log::error!(
                        "Durable delete for '{}' failed, using memory fallback: {}",
                        key,
                        e
                    );
                }
            }
        }
        self.memory.delete(key).await
    }

    async fn delete_older_than(&self, prefix: &str, cutoff_ms: i64) -> Result<u64> {
        // TTL is self-cleaning on the durable side; the sweep only has to
        // bound the in-process map.
        self.memory.delete_older_than(prefix, cutoff_ms).await
    }

    async fn flush_all(&self) -> Result<()> {
        if let Some(ref durable) = self.durable {
            if let Err(e) = durable.flush_all().await {
                log::error!("Durable flush failed: {}", e);
            }
        }
        self.memory.flush_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FailingStore;

    fn failing_fallback() -> FallbackStore {
        FallbackStore::new(
            Some(Arc::new(FailingStore::new())),
            Arc::new(InMemoryStore::new()),
        )
    }

    #[tokio::test]
    async fn test_memory_only_roundtrip() {
        let store = FallbackStore::new(None, Arc::new(InMemoryStore::new()));
        store.set("k", "v", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_durable_failure_falls_back_on_set_and_get() {
        let store = failing_fallback();

        // The caller never sees the durable error
        store.set("k", "v", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.memory().len(), 1);
    }

    #[tokio::test]
    async fn test_durable_failure_falls_back_on_delete() {
        let store = failing_fallback();
        store.set("k", "v", None).await.unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_flush_all_clears_memory_despite_durable_failure() {
        let store = failing_fallback();
        store.set("k", "v", None).await.unwrap();
        store.flush_all().await.unwrap();
        assert!(store.memory().is_empty());
    }

    #[tokio::test]
    async fn test_from_settings_memory_only() {
        let store = FallbackStore::from_settings(&StoreSettings::default());
        store.set("k", "v", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }
}
