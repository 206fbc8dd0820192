//! Webhook replay and nonce protection.
//!
//! Two independent checks gate every webhook before any payment or booking
//! state mutation:
//!
//! 1. **Timestamp freshness**: rejects deliveries from the future (beyond
//!    clock-skew tolerance) or older than the timeout window. Pure
//!    arithmetic, no I/O, checked first.
//! 2. **Duplicate detection**: a ledger entry under the provider+event key,
//!    whatever its status, marks the delivery as a replay.
//!
//! Failure handling is asymmetric: a ledger READ failure fails open, since
//! the timestamp check already bounds the replay window, while a nonce
//! ledger WRITE failure fails closed, since an unrecorded nonce cannot
//! resist replay on the next delivery. Callers must not unify the two.

use std::sync::Arc;
use std::time::Duration;

use stayforge_commons::{now_millis, ReplaySettings};
use stayforge_store::{TimedKeyValueStore, TypedStoreExt};

use crate::error::Result;
use crate::models::{WebhookEventStatus, WebhookLedgerEntry};
use crate::nonce::parse_nonce;

/// Store namespace for all ledger entries.
const LEDGER_PREFIX: &str = "webhook";

/// Event type recorded for verified nonces.
const NONCE_EVENT_TYPE: &str = "nonce_validation";

/// Verdict of the timestamp freshness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampValidity {
    Valid,
    /// Timestamp is ahead of the clock beyond the skew tolerance
    InFuture,
    /// Timestamp is older than the timeout window
    Expired,
}

/// Verdict of the composed replay-protection check.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayVerdict {
    Accepted,
    Rejected {
        reason: String,
        /// True when the rejection came from duplicate detection
        duplicate: bool,
    },
}

impl ReplayVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ReplayVerdict::Accepted)
    }
}

/// Parse a webhook timestamp supplied as the string form of epoch millis.
pub fn parse_webhook_timestamp(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Replay guard for payment-gateway webhooks.
///
/// `provider` is the short gateway name (e.g. `"momo"`); `event_id` is
/// whatever uniqueness token the gateway supplies. Guards sharing a store
/// with other policies isolate through the `webhook` key namespace.
pub struct ReplayGuard {
    store: Arc<dyn TimedKeyValueStore>,
    settings: ReplaySettings,
}

impl ReplayGuard {
    pub fn new(store: Arc<dyn TimedKeyValueStore>, settings: ReplaySettings) -> Self {
        Self { store, settings }
    }

    fn ledger_key(provider: &str, event_id: &str) -> String {
        format!("{}:{}:{}", LEDGER_PREFIX, provider, event_id)
    }

    fn nonce_key(provider: &str, nonce: &str) -> String {
        format!("{}:{}_nonce_{}", LEDGER_PREFIX, provider, nonce)
    }

    fn ledger_ttl(&self) -> Duration {
        Duration::from_secs(self.settings.retention_days as u64 * 24 * 60 * 60)
    }

    /// Freshness check for a webhook timestamp in epoch millis.
    pub fn validate_timestamp(&self, timestamp_ms: i64) -> TimestampValidity {
        let now = now_millis();
        let skew = self.settings.clock_skew_seconds as i64 * 1000;
        let timeout = self.settings.timeout_seconds as i64 * 1000;

        if timestamp_ms > now + skew {
            TimestampValidity::InFuture
        } else if now - timestamp_ms > timeout {
            TimestampValidity::Expired
        } else {
            TimestampValidity::Valid
        }
    }

    /// Ledger presence check with fail-open error handling.
    async fn ledger_has(&self, key: &str, context: &str) -> bool {
        match self.store.get(key).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                log::error!(
                    "Webhook {} read failed for '{}', failing open: {}",
                    context,
                    key,
                    e
                );
                false
            }
        }
    }

    /// Whether `(provider, event_id)` has already been recorded.
    ///
    /// Any ledger record counts as a duplicate, regardless of its status.
    /// A read failure is treated as not-duplicate and logged.
    pub async fn is_duplicate(&self, provider: &str, event_id: &str) -> bool {
        self.ledger_has(&Self::ledger_key(provider, event_id), "duplicate check")
            .await
    }

    /// Composed replay protection: timestamp first, then the duplicate read.
    ///
    /// `timestamp = None` skips timestamp validation entirely
    /// (duplicate-only protection).
    pub async fn validate_webhook(
        &self,
        provider: &str,
        event_id: &str,
        timestamp: Option<i64>,
    ) -> ReplayVerdict {
        if let Some(ts) = timestamp {
            match self.validate_timestamp(ts) {
                TimestampValidity::Valid => {}
                TimestampValidity::InFuture => {
                    log::warn!(
                        "Rejected webhook from provider '{}': timestamp in the future",
                        provider
                    );
                    return ReplayVerdict::Rejected {
                        reason: "Webhook timestamp is in the future".to_string(),
                        duplicate: false,
                    };
                }
                TimestampValidity::Expired => {
                    log::warn!(
                        "Rejected webhook from provider '{}': timestamp too old",
                        provider
                    );
                    return ReplayVerdict::Rejected {
                        reason: "Webhook timestamp is too old".to_string(),
                        duplicate: false,
                    };
                }
            }
        }

        if self.is_duplicate(provider, event_id).await {
            log::warn!(
                "Rejected duplicate webhook: provider='{}' event_id='{}'",
                provider,
                event_id
            );
            return ReplayVerdict::Rejected {
                reason: "Duplicate webhook delivery".to_string(),
                duplicate: true,
            };
        }

        ReplayVerdict::Accepted
    }

    /// Record an accepted webhook so gateway retries become no-ops.
    ///
    /// Returns `false` when the event was already recorded; the existing
    /// entry is left untouched, never overwritten.
    pub async fn record_webhook_event(
        &self,
        provider: &str,
        event_id: &str,
        event_type: &str,
        status: WebhookEventStatus,
        payload: Option<serde_json::Value>,
    ) -> Result<bool> {
        let key = Self::ledger_key(provider, event_id);

        if self.store.get(&key).await?.is_some() {
            log::debug!("Webhook event already recorded: {}", key);
            return Ok(false);
        }

        let entry = WebhookLedgerEntry {
            event_id: event_id.to_string(),
            event_type: event_type.to_string(),
            status,
            created_at: now_millis(),
            payload,
        };
        self.store
            .put_record(&key, &entry, Some(self.ledger_ttl()))
            .await?;
        Ok(true)
    }

    /// Verify a single-use webhook nonce.
    ///
    /// Accepts a fresh, well-formed, current-timestamp nonce exactly once;
    /// the accepting call writes the ledger entry before returning `true`,
    /// and a failed write rejects the nonce.
    pub async fn verify_webhook_nonce(&self, provider: &str, nonce: &str) -> bool {
        let Some(parts) = parse_nonce(nonce) else {
            log::warn!("Rejected malformed webhook nonce from provider '{}'", provider);
            return false;
        };

        match self.validate_timestamp(parts.timestamp) {
            TimestampValidity::Valid => {}
            TimestampValidity::InFuture => {
                log::warn!(
                    "Rejected webhook nonce from provider '{}': timestamp in the future",
                    provider
                );
                return false;
            }
            TimestampValidity::Expired => {
                log::warn!(
                    "Rejected webhook nonce from provider '{}': timestamp too old",
                    provider
                );
                return false;
            }
        }

        let key = Self::nonce_key(provider, nonce);
        if self.ledger_has(&key, "nonce duplicate check").await {
            log::warn!("Rejected replayed webhook nonce from provider '{}'", provider);
            return false;
        }

        let entry = WebhookLedgerEntry {
            event_id: nonce.to_string(),
            event_type: NONCE_EVENT_TYPE.to_string(),
            status: WebhookEventStatus::Completed,
            created_at: now_millis(),
            payload: Some(serde_json::json!({
                "nonce": nonce,
                "timestamp": parts.timestamp,
            })),
        };

        if let Err(e) = self
            .store
            .put_record(&key, &entry, Some(self.ledger_ttl()))
            .await
        {
            log::error!(
                "Failed to record webhook nonce for provider '{}', rejecting: {}",
                provider,
                e
            );
            return false;
        }

        true
    }

    /// Purge ledger entries older than `days_to_keep` days.
    ///
    /// Returns the number of entries removed from the in-process side;
    /// durable-side entries expire through their TTL. Errors are logged and
    /// reported as 0.
    pub async fn cleanup_old_webhook_protection_data(&self, days_to_keep: u32) -> u64 {
        let cutoff = now_millis() - days_to_keep as i64 * 24 * 60 * 60 * 1000;
        let prefix = format!("{}:", LEDGER_PREFIX);

        match self.store.delete_older_than(&prefix, cutoff).await {
            Ok(count) => {
                log::info!(
                    "Webhook protection cleanup removed {} ledger entries",
                    count
                );
                count
            }
            Err(e) => {
                log::error!("Webhook protection cleanup failed: {}", e);
                0
            }
        }
    }
}
