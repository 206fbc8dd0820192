//! # stayforge-guard
//!
//! Abuse-protection policies for the StayForge platform:
//!
//! - [`BruteForceGuard`]: windowed failure counting with hard lockout,
//!   gating `/api/auth/*` login attempts.
//! - [`ReplayGuard`]: webhook replay and nonce protection, gating
//!   `/api/webhooks/*` before any payment or booking state mutation.
//!
//! Both policies sit on the [`stayforge_store`] dual-backend store: state
//! lives in the durable key-value backend when reachable and degrades to
//! the shared in-process map when it is not.

pub mod attempt_counter;
pub mod brute_force;
pub mod error;
pub mod models;
pub mod nonce;
pub mod replay;

pub use attempt_counter::AttemptCounter;
pub use brute_force::{AttemptCheck, BruteForceGuard};
pub use error::{GuardError, Result};
pub use models::{AttemptRecord, WebhookEventStatus, WebhookLedgerEntry};
pub use nonce::generate_webhook_nonce;
pub use replay::{parse_webhook_timestamp, ReplayGuard, ReplayVerdict, TimestampValidity};
