//! Brute-force lockout policy.
//!
//! Composes the windowed [`AttemptCounter`] with a block-duration policy:
//! once an identifier reaches the attempt limit inside the window, it is
//! denied for a fixed duration regardless of later window resets.
//!
//! Callers gate each attempt with [`BruteForceGuard::check`] before
//! verifying credentials and call [`BruteForceGuard::record_failure`] after
//! a failure; [`BruteForceGuard::clear`] on success returns the identifier
//! to the fully-open state.
//!
//! Known limitation: `check` and `record_failure` are separate
//! read-modify-write operations without an atomic increment, so two
//! concurrent failures for the same identifier can be counted as one. See
//! DESIGN.md for why this is documented rather than narrowed per backend.

use std::sync::Arc;

use stayforge_commons::{now_millis, BruteForceSettings};
use stayforge_store::TimedKeyValueStore;

use crate::attempt_counter::AttemptCounter;
use crate::error::Result;

/// Outcome of a brute-force check for one identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptCheck {
    /// Whether the attempt may proceed
    pub allowed: bool,

    /// Attempts left before the next check blocks
    pub remaining_attempts: u32,

    /// Unix timestamp in milliseconds when an active block expires
    pub blocked_until: Option<i64>,
}

impl AttemptCheck {
    fn open(remaining_attempts: u32) -> Self {
        Self {
            allowed: true,
            remaining_attempts,
            blocked_until: None,
        }
    }

    fn blocked(blocked_until: i64) -> Self {
        Self {
            allowed: false,
            remaining_attempts: 0,
            blocked_until: Some(blocked_until),
        }
    }

    /// User-facing lockout message, present only when blocked.
    pub fn message(&self) -> Option<String> {
        let blocked_until = self.blocked_until?;
        if self.allowed {
            return None;
        }
        let remaining_ms = (blocked_until - now_millis()).max(0);
        let minutes = (remaining_ms + 59_999) / 60_000;
        Some(format!(
            "Too many failed attempts. Temporarily blocked, try again in {} minute{}.",
            minutes,
            if minutes == 1 { "" } else { "s" }
        ))
    }
}

/// Brute-force guard for caller-supplied identifiers (e.g. `ip:email`).
///
/// The guard never inspects identifier structure; isolation between policy
/// instances sharing one store is by the settings' `key_prefix`.
pub struct BruteForceGuard {
    counter: AttemptCounter,
}

impl BruteForceGuard {
    pub fn new(store: Arc<dyn TimedKeyValueStore>, settings: BruteForceSettings) -> Self {
        Self {
            counter: AttemptCounter::new(store, settings),
        }
    }

    /// Check whether `identifier` may attempt.
    ///
    /// State machine, in order:
    /// 1. no record → open with the full allowance;
    /// 2. active `blocked_until` → blocked;
    /// 3. expired window → open with the full allowance (record untouched);
    /// 4. count at the limit → transition to blocked and persist;
    /// 5. otherwise open with the remaining allowance.
    pub async fn check(&self, identifier: &str) -> Result<AttemptCheck> {
        let now = now_millis();
        let settings = self.counter.settings();
        let max_attempts = settings.max_attempts;

        let Some(record) = self.counter.load(identifier).await? else {
            return Ok(AttemptCheck::open(max_attempts));
        };

        if let Some(blocked_until) = record.blocked_until {
            if now < blocked_until {
                return Ok(AttemptCheck::blocked(blocked_until));
            }
        }

        if self.counter.window_expired(&record, now) {
            return Ok(AttemptCheck::open(max_attempts));
        }

        if record.count >= max_attempts {
            let blocked_until = now + settings.block_seconds as i64 * 1000;
            let mut updated = record;
            updated.blocked_until = Some(blocked_until);
            self.counter.save(identifier, &updated).await?;

            log::warn!(
                "Blocking identifier under prefix '{}' after {} failed attempts",
                settings.key_prefix,
                updated.count
            );
            return Ok(AttemptCheck::blocked(blocked_until));
        }

        Ok(AttemptCheck::open(max_attempts - record.count))
    }

    /// Record one failed attempt for `identifier`.
    pub async fn record_failure(&self, identifier: &str) -> Result<()> {
        self.counter.record_failure(identifier).await?;
        Ok(())
    }

    /// Forget all failures for `identifier`, cancelling any active block.
    pub async fn clear(&self, identifier: &str) -> Result<()> {
        self.counter.clear(identifier).await
    }

    /// Convenience: whether the next attempt would be denied.
    pub async fn is_blocked(&self, identifier: &str) -> Result<bool> {
        Ok(!self.check(identifier).await?.allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttemptRecord;
    use stayforge_store::InMemoryStore;

    fn guard_with(settings: BruteForceSettings) -> BruteForceGuard {
        BruteForceGuard::new(Arc::new(InMemoryStore::new()), settings)
    }

    fn guard() -> BruteForceGuard {
        guard_with(BruteForceSettings::default())
    }

    #[tokio::test]
    async fn test_fresh_identifier_is_open() {
        let guard = guard();
        let check = guard.check("ip:1.2.3.4").await.unwrap();
        assert!(check.allowed);
        assert_eq!(check.remaining_attempts, 5);
        assert!(check.blocked_until.is_none());
        assert!(check.message().is_none());
    }

    #[tokio::test]
    async fn test_blocks_after_max_attempts() {
        let guard = guard();
        for _ in 0..5 {
            guard.record_failure("ip:1.2.3.4").await.unwrap();
        }

        let check = guard.check("ip:1.2.3.4").await.unwrap();
        assert!(!check.allowed);
        assert_eq!(check.remaining_attempts, 0);

        let blocked_until = check.blocked_until.unwrap();
        let expected = now_millis() + 900 * 1000;
        assert!((blocked_until - expected).abs() < 5_000);
        assert!(check.message().unwrap().contains("Too many failed attempts"));
    }

    #[tokio::test]
    async fn test_remaining_attempts_counts_down() {
        let guard = guard();
        guard.record_failure("ip:1.2.3.4").await.unwrap();
        guard.record_failure("ip:1.2.3.4").await.unwrap();

        let check = guard.check("ip:1.2.3.4").await.unwrap();
        assert!(check.allowed);
        assert_eq!(check.remaining_attempts, 3);
    }

    #[tokio::test]
    async fn test_clear_cancels_block() {
        let guard = guard();
        for _ in 0..5 {
            guard.record_failure("ip:1.2.3.4").await.unwrap();
        }
        assert!(guard.is_blocked("ip:1.2.3.4").await.unwrap());

        guard.clear("ip:1.2.3.4").await.unwrap();
        let check = guard.check("ip:1.2.3.4").await.unwrap();
        assert!(check.allowed);
        assert_eq!(check.remaining_attempts, 5);
    }

    #[tokio::test]
    async fn test_identifiers_do_not_influence_each_other() {
        let guard = guard();
        for _ in 0..5 {
            guard.record_failure("ip:1.2.3.4").await.unwrap();
        }
        assert!(guard.is_blocked("ip:1.2.3.4").await.unwrap());
        assert!(!guard.is_blocked("ip:5.6.7.8").await.unwrap());
    }

    #[tokio::test]
    async fn test_window_expiry_resets_allowance_without_mutation() {
        let store = Arc::new(InMemoryStore::new());
        let guard = BruteForceGuard::new(store, BruteForceSettings::default());

        // Four failures that happened longer than a window ago
        let stale = AttemptRecord {
            count: 4,
            last_attempt: now_millis() - 2 * 3600 * 1000,
            blocked_until: None,
        };
        guard.counter.save("ip:1.2.3.4", &stale).await.unwrap();

        let check = guard.check("ip:1.2.3.4").await.unwrap();
        assert!(check.allowed);
        assert_eq!(check.remaining_attempts, 5);

        // check does not rewrite the record
        let record = guard.counter.load("ip:1.2.3.4").await.unwrap().unwrap();
        assert_eq!(record, stale);
    }

    #[tokio::test]
    async fn test_active_block_outlives_window_expiry() {
        let guard = guard();

        let record = AttemptRecord {
            count: 5,
            last_attempt: now_millis() - 2 * 3600 * 1000,
            blocked_until: Some(now_millis() + 600 * 1000),
        };
        guard.counter.save("ip:1.2.3.4", &record).await.unwrap();

        let check = guard.check("ip:1.2.3.4").await.unwrap();
        assert!(!check.allowed);
        assert_eq!(check.blocked_until, record.blocked_until);
    }

    #[tokio::test]
    async fn test_at_limit_count_blocks_only_on_check() {
        let guard = guard();
        for _ in 0..5 {
            guard.record_failure("ip:1.2.3.4").await.unwrap();
        }

        // record_failure alone never wrote a block marker
        let record = guard.counter.load("ip:1.2.3.4").await.unwrap().unwrap();
        assert_eq!(record.count, 5);
        assert!(record.blocked_until.is_none());

        // The next check performs the transition and persists it
        assert!(!guard.check("ip:1.2.3.4").await.unwrap().allowed);
        let record = guard.counter.load("ip:1.2.3.4").await.unwrap().unwrap();
        assert!(record.blocked_until.is_some());
    }

    #[tokio::test]
    async fn test_expired_block_with_live_window_reblocks() {
        let guard = guard();

        let record = AttemptRecord {
            count: 5,
            last_attempt: now_millis() - 60 * 1000,
            blocked_until: Some(now_millis() - 1000),
        };
        guard.counter.save("ip:1.2.3.4", &record).await.unwrap();

        // Window still live and count at the limit: a fresh block is set
        let check = guard.check("ip:1.2.3.4").await.unwrap();
        assert!(!check.allowed);
        assert!(check.blocked_until.unwrap() > now_millis());
    }
}
