//! Periodic retention sweep for the in-process map.
//!
//! The durable backend expires entries through native TTL; the in-process
//! fallback map only expires lazily on read, so keys that are never read
//! again would accumulate. The sweeper deletes entries older than a
//! per-prefix retention ceiling on a timer the host application owns:
//! nothing is spawned at construction time, and the returned handle stops
//! the task on demand.

use std::sync::Arc;
use std::time::Duration;

use stayforge_commons::now_millis;
use tokio::task::JoinHandle;

use crate::store_trait::TimedKeyValueStore;

/// One retention rule: entries under `prefix` live at most `retention`.
#[derive(Debug, Clone)]
pub struct SweepRule {
    pub prefix: String,
    pub retention: Duration,
}

impl SweepRule {
    pub fn new(prefix: impl Into<String>, retention: Duration) -> Self {
        Self {
            prefix: prefix.into(),
            retention,
        }
    }
}

/// Retention sweep task over a shared store.
pub struct RetentionSweeper {
    store: Arc<dyn TimedKeyValueStore>,
    rules: Vec<SweepRule>,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn TimedKeyValueStore>, rules: Vec<SweepRule>) -> Self {
        Self { store, rules }
    }

    /// Run one sweep pass over all rules.
    ///
    /// Returns the number of entries removed. A rule that fails is logged
    /// and skipped; the pass continues with the remaining rules.
    pub async fn run_sweep(&self) -> u64 {
        let now = now_millis();
        let mut removed = 0u64;

        for rule in &self.rules {
            let cutoff = now - rule.retention.as_millis() as i64;
            match self.store.delete_older_than(&rule.prefix, cutoff).await {
                Ok(count) => removed += count,
                Err(e) => {
                    log::error!("Retention sweep for prefix '{}' failed: {}", rule.prefix, e);
                }
            }
        }

        if removed > 0 {
            log::info!("Retention sweep removed {} expired entries", removed);
        }
        removed
    }

    /// Start the scheduled sweep loop.
    ///
    /// Runs `run_sweep` every `interval` until the returned handle is
    /// stopped or dropped by the host.
    pub fn start_scheduled(self, interval: Duration) -> SweeperHandle {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so a fresh process
            // does not sweep an empty map.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = self.run_sweep().await;
                log::debug!("Scheduled retention sweep removed {} entries", removed);
            }
        });

        SweeperHandle { handle }
    }
}

/// Handle to a running sweep loop. Stopping aborts the task.
pub struct SweeperHandle {
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
