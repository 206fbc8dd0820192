//! Windowed failure counting over the keyed store.
//!
//! The counter owns the record lifecycle (load, record, clear) and the
//! window arithmetic; the blocking policy on top lives in
//! [`crate::brute_force::BruteForceGuard`].

use std::sync::Arc;
use std::time::Duration;

use stayforge_commons::{now_millis, BruteForceSettings};
use stayforge_store::{TimedKeyValueStore, TypedStoreExt};

use crate::error::Result;
use crate::models::AttemptRecord;

/// Extra TTL on top of window + block so a record never expires while the
/// block it carries is still active.
const TTL_BUFFER: Duration = Duration::from_secs(60);

/// Per-identifier failure counter with window reset.
pub struct AttemptCounter {
    store: Arc<dyn TimedKeyValueStore>,
    settings: BruteForceSettings,
}

impl AttemptCounter {
    pub fn new(store: Arc<dyn TimedKeyValueStore>, settings: BruteForceSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &BruteForceSettings {
        &self.settings
    }

    /// Store key for an identifier, namespaced by the policy prefix.
    fn storage_key(&self, identifier: &str) -> String {
        format!("{}:{}", self.settings.key_prefix, identifier)
    }

    /// TTL for persisted records: window + block + buffer.
    fn record_ttl(&self) -> Duration {
        Duration::from_secs(self.settings.window_seconds + self.settings.block_seconds)
            + TTL_BUFFER
    }

    /// Whether the failure window has lapsed since the last attempt.
    pub fn window_expired(&self, record: &AttemptRecord, now: i64) -> bool {
        now - record.last_attempt > self.settings.window_seconds as i64 * 1000
    }

    pub async fn load(&self, identifier: &str) -> Result<Option<AttemptRecord>> {
        let record = self
            .store
            .get_record(&self.storage_key(identifier))
            .await?;
        Ok(record)
    }

    pub async fn save(&self, identifier: &str, record: &AttemptRecord) -> Result<()> {
        self.store
            .put_record(&self.storage_key(identifier), record, Some(self.record_ttl()))
            .await?;
        Ok(())
    }

    /// Record one failure: start fresh when there is no record or the window
    /// has expired, otherwise increment. Always refreshes `last_attempt`.
    ///
    /// Never sets `blocked_until`: the block transition belongs to the
    /// check path, which callers run before every attempt.
    pub async fn record_failure(&self, identifier: &str) -> Result<AttemptRecord> {
        let now = now_millis();
        let record = match self.load(identifier).await? {
            Some(mut record) if !self.window_expired(&record, now) => {
                record.count = record.count.saturating_add(1);
                record.last_attempt = now;
                record
            }
            _ => AttemptRecord {
                count: 1,
                last_attempt: now,
                blocked_until: None,
            },
        };
        self.save(identifier, &record).await?;
        log::debug!(
            "Recorded failed attempt {} for identifier under prefix '{}'",
            record.count,
            self.settings.key_prefix
        );
        Ok(record)
    }

    /// Delete the record, returning the identifier to the fully-open state.
    pub async fn clear(&self, identifier: &str) -> Result<()> {
        self.store.delete(&self.storage_key(identifier)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stayforge_store::InMemoryStore;

    fn counter() -> AttemptCounter {
        AttemptCounter::new(
            Arc::new(InMemoryStore::new()),
            BruteForceSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_first_failure_starts_at_one() {
        let counter = counter();
        let record = counter.record_failure("ip:1.2.3.4").await.unwrap();
        assert_eq!(record.count, 1);
        assert!(record.blocked_until.is_none());
    }

    #[tokio::test]
    async fn test_failures_increment_within_window() {
        let counter = counter();
        for _ in 0..3 {
            counter.record_failure("ip:1.2.3.4").await.unwrap();
        }
        let record = counter.load("ip:1.2.3.4").await.unwrap().unwrap();
        assert_eq!(record.count, 3);
    }

    #[tokio::test]
    async fn test_expired_window_starts_fresh() {
        let counter = counter();

        // Seed a record whose last attempt predates the window
        let stale = AttemptRecord {
            count: 4,
            last_attempt: now_millis() - 2 * 3600 * 1000,
            blocked_until: None,
        };
        counter.save("ip:1.2.3.4", &stale).await.unwrap();

        let record = counter.record_failure("ip:1.2.3.4").await.unwrap();
        assert_eq!(record.count, 1);
    }

    #[tokio::test]
    async fn test_increment_preserves_block_marker() {
        let counter = counter();
        let blocked = AttemptRecord {
            count: 5,
            last_attempt: now_millis(),
            blocked_until: Some(now_millis() + 60_000),
        };
        counter.save("ip:1.2.3.4", &blocked).await.unwrap();

        let record = counter.record_failure("ip:1.2.3.4").await.unwrap();
        assert_eq!(record.count, 6);
        assert!(record.blocked_until.is_some());
    }

    #[tokio::test]
    async fn test_clear_removes_record() {
        let counter = counter();
        counter.record_failure("ip:1.2.3.4").await.unwrap();
        counter.clear("ip:1.2.3.4").await.unwrap();
        assert!(counter.load("ip:1.2.3.4").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prefix_isolation_on_shared_store() {
        let store: Arc<dyn TimedKeyValueStore> = Arc::new(InMemoryStore::new());

        let login = AttemptCounter::new(
            store.clone(),
            BruteForceSettings {
                key_prefix: "login".to_string(),
                ..Default::default()
            },
        );
        let reset = AttemptCounter::new(
            store.clone(),
            BruteForceSettings {
                key_prefix: "password_reset".to_string(),
                ..Default::default()
            },
        );

        login.record_failure("ip:1.2.3.4").await.unwrap();
        login.record_failure("ip:1.2.3.4").await.unwrap();

        assert!(reset.load("ip:1.2.3.4").await.unwrap().is_none());
        assert_eq!(
            login.load("ip:1.2.3.4").await.unwrap().unwrap().count,
            2
        );
    }
}
