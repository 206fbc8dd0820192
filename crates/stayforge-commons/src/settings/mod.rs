//! Policy settings for the abuse-protection core.
//!
//! Plain serde structs, immutable after construction. Every field has a
//! serde default so a partial config section deserializes cleanly; the host
//! application owns file loading and environment overrides.

mod defaults;
mod types;

pub use types::{BruteForceSettings, ProtectionSettings, ReplaySettings, StoreSettings};
