//! # stayforge-commons
//!
//! Shared building blocks for the StayForge abuse-protection core:
//! policy settings and the wall-clock helper used by every record type.
//!
//! This crate owns no I/O. Settings are plain serde structs so the host
//! application can load them from its own config file and hand them to the
//! guards at construction time.

pub mod settings;
pub mod time;

pub use settings::{
    BruteForceSettings, ProtectionSettings, ReplaySettings, StoreSettings,
};
pub use time::now_millis;
