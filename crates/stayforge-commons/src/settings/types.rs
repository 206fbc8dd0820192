use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Brute-force lockout settings (one instance per policy).
///
/// Two policy instances with different `key_prefix` values are fully
/// isolated even when they share the same physical store: the same raw
/// identifier under different prefixes never collides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BruteForceSettings {
    /// Maximum failed attempts within the window before lockout (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Rolling failure window in seconds (default: 3600 = 1 hour)
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Hard block duration in seconds once the limit is reached (default: 900)
    ///
    /// A block outlives window resets: `blocked_until` in the future denies
    /// the identifier even after the failure window has expired.
    #[serde(default = "default_block_seconds")]
    pub block_seconds: u64,

    /// Key namespace for this policy instance (default: "login")
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for BruteForceSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_seconds: default_window_seconds(),
            block_seconds: default_block_seconds(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// Webhook replay-protection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySettings {
    /// Maximum webhook age in seconds before rejection (default: 300)
    #[serde(default = "default_replay_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Tolerated forward clock skew in seconds (default: 60)
    ///
    /// Timestamps up to this far in the future are accepted; beyond it the
    /// delivery is rejected as "from the future".
    #[serde(default = "default_clock_skew_seconds")]
    pub clock_skew_seconds: u64,

    /// Ledger retention in days for the periodic cleanup (default: 7)
    #[serde(default = "default_ledger_retention_days")]
    pub retention_days: u32,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_replay_timeout_seconds(),
            clock_skew_seconds: default_clock_skew_seconds(),
            retention_days: default_ledger_retention_days(),
        }
    }
}

/// Store backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Base URL of the REST key-value backend (None = memory-only mode)
    #[serde(default)]
    pub durable_url: Option<String>,

    /// Bearer token for the REST key-value backend
    #[serde(default)]
    pub durable_token: Option<String>,

    /// Request timeout in seconds for durable backend calls (default: 2)
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Retention ceiling in seconds for attempt records in the in-process
    /// fallback map (default: 7200 = 2 hours)
    #[serde(default = "default_attempt_retention_seconds")]
    pub attempt_retention_seconds: u64,

    /// Retention ceiling in seconds for ledger entries in the in-process
    /// fallback map (default: 604800 = 7 days)
    #[serde(default = "default_ledger_retention_seconds")]
    pub ledger_retention_seconds: u64,

    /// Interval in seconds between retention sweeps (default: 600)
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            durable_url: None,
            durable_token: None,
            request_timeout_seconds: default_request_timeout_seconds(),
            attempt_retention_seconds: default_attempt_retention_seconds(),
            ledger_retention_seconds: default_ledger_retention_seconds(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

/// Aggregate settings for the whole protection core.
///
/// Mirrors one section of the platform's config file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProtectionSettings {
    #[serde(default)]
    pub brute_force: BruteForceSettings,

    #[serde(default)]
    pub replay: ReplaySettings,

    #[serde(default)]
    pub store: StoreSettings,
}
