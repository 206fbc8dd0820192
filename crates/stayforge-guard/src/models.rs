//! Record models persisted by the protection policies.

use serde::{Deserialize, Serialize};

/// Failure-counting record, one per identifier and policy.
///
/// `blocked_until` is only ever set once `count` has reached the policy's
/// maximum; clearing the attempts removes the whole record and with it any
/// active block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Failures recorded in the current window
    pub count: u32,

    /// Unix timestamp in milliseconds of the most recent failure
    pub last_attempt: i64,

    /// Unix timestamp in milliseconds when the block expires (None = open)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_until: Option<i64>,
}

/// Processing status of a recorded webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookEventStatus {
    Pending,
    Completed,
    Failed,
}

/// Idempotency-ledger entry, one per provider+event id or per nonce.
///
/// Presence of an entry, regardless of status, marks any later delivery
/// with the same id as a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookLedgerEntry {
    /// Uniqueness token supplied by the gateway (or the nonce itself)
    pub event_id: String,

    /// Event category, e.g. "payment_update" or "nonce_validation"
    pub event_type: String,

    pub status: WebhookEventStatus,

    /// Unix timestamp in milliseconds when the entry was first accepted
    pub created_at: i64,

    /// Opaque extra data; nonce entries carry `{nonce, timestamp}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}
