//! End-to-end webhook replay-protection flow.
//!
//! Drives the guard the way the webhook route handlers do: validate the
//! delivery, process, record the event, and watch gateway retries become
//! no-ops. Nonce verification and retention cleanup are exercised on the
//! same shared store.

use std::sync::Arc;

use stayforge_commons::{now_millis, ReplaySettings};
use stayforge_guard::{
    generate_webhook_nonce, ReplayGuard, ReplayVerdict, WebhookEventStatus,
};
use stayforge_store::{FallbackStore, InMemoryStore, TimedKeyValueStore};

fn memory_fallback() -> Arc<dyn TimedKeyValueStore> {
    Arc::new(FallbackStore::new(None, Arc::new(InMemoryStore::new())))
}

fn guard() -> ReplayGuard {
    ReplayGuard::new(memory_fallback(), ReplaySettings::default())
}

/// A fresh delivery is accepted once; the recorded retry is rejected as a
/// duplicate, with the flag the handler uses to acknowledge instead of
/// reprocess.
#[tokio::test]
async fn test_delivery_then_retry() {
    let guard = guard();
    let ts = now_millis();

    let verdict = guard.validate_webhook("momo", "txn-20260806-001", Some(ts)).await;
    assert!(verdict.is_accepted());

    // Handler processed the payment and records the event
    let written = guard
        .record_webhook_event(
            "momo",
            "txn-20260806-001",
            "payment_update",
            WebhookEventStatus::Completed,
            Some(serde_json::json!({"order_id": "bk-123", "amount": 1_250_000})),
        )
        .await
        .unwrap();
    assert!(written);

    // The gateway retries the same delivery
    match guard.validate_webhook("momo", "txn-20260806-001", Some(now_millis())).await {
        ReplayVerdict::Rejected { duplicate, .. } => assert!(duplicate),
        ReplayVerdict::Accepted => panic!("retry must be rejected as duplicate"),
    }
}

#[tokio::test]
async fn test_stale_and_future_deliveries_rejected_without_ledger_io() {
    let guard = guard();

    let stale = guard
        .validate_webhook("vnpay", "txn-1", Some(now_millis() - 10 * 60 * 1000))
        .await;
    assert!(matches!(stale, ReplayVerdict::Rejected { duplicate: false, .. }));

    let future = guard
        .validate_webhook("vnpay", "txn-1", Some(now_millis() + 5 * 60 * 1000))
        .await;
    assert!(matches!(future, ReplayVerdict::Rejected { duplicate: false, .. }));

    // Neither rejection touched the ledger: the id is still fresh
    assert!(!guard.is_duplicate("vnpay", "txn-1").await);
}

#[tokio::test]
async fn test_duplicate_detection_ignores_status() {
    let guard = guard();
    guard
        .record_webhook_event("zalopay", "txn-9", "payment_update", WebhookEventStatus::Failed, None)
        .await
        .unwrap();

    // A failed processing attempt still counts as seen
    assert!(guard.is_duplicate("zalopay", "txn-9").await);
}

#[tokio::test]
async fn test_same_event_id_across_providers() {
    let guard = guard();
    guard
        .record_webhook_event("momo", "order-77", "payment_update", WebhookEventStatus::Completed, None)
        .await
        .unwrap();

    assert!(guard.is_duplicate("momo", "order-77").await);
    assert!(!guard.is_duplicate("vnpay", "order-77").await);
    assert!(guard.validate_webhook("vnpay", "order-77", None).await.is_accepted());
}

#[tokio::test]
async fn test_nonce_full_matrix() {
    let guard = guard();

    // Fresh, well-formed nonce verifies exactly once
    let nonce = generate_webhook_nonce();
    assert!(guard.verify_webhook_nonce("momo", &nonce).await);
    assert!(!guard.verify_webhook_nonce("momo", &nonce).await);

    // Malformed shapes
    assert!(!guard.verify_webhook_nonce("momo", "").await);
    assert!(!guard.verify_webhook_nonce("momo", "no-separator").await);
    assert!(!guard.verify_webhook_nonce("momo", "123_tooshort").await);

    // Stale timestamp with a valid shape
    let stale = format!(
        "{}_{}",
        now_millis() - 6 * 60 * 1000,
        "0123456789abcdef0123456789abcdef"
    );
    assert!(!guard.verify_webhook_nonce("momo", &stale).await);
}

/// The same nonce value is tracked per provider, so one provider's
/// acceptance does not consume it for another.
#[tokio::test]
async fn test_nonce_is_scoped_per_provider() {
    let guard = guard();
    let nonce = generate_webhook_nonce();

    assert!(guard.verify_webhook_nonce("momo", &nonce).await);
    assert!(guard.verify_webhook_nonce("vnpay", &nonce).await);
    assert!(!guard.verify_webhook_nonce("momo", &nonce).await);
}

#[tokio::test]
async fn test_cleanup_reports_removed_count() {
    let guard = guard();

    for _ in 0..3 {
        let nonce = generate_webhook_nonce();
        assert!(guard.verify_webhook_nonce("momo", &nonce).await);
    }
    guard
        .record_webhook_event("momo", "txn-5", "payment_update", WebhookEventStatus::Completed, None)
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    // Zero retention treats every entry as expired
    assert_eq!(guard.cleanup_old_webhook_protection_data(0).await, 4);
    assert!(!guard.is_duplicate("momo", "txn-5").await);

    // Default retention removes nothing from a fresh ledger
    let nonce = generate_webhook_nonce();
    assert!(guard.verify_webhook_nonce("momo", &nonce).await);
    assert_eq!(guard.cleanup_old_webhook_protection_data(7).await, 0);
}
