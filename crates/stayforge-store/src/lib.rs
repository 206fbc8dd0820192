//! # stayforge-store
//!
//! Keyed, TTL-aware record store for the abuse-protection core, with a
//! durable-first, memory-fallback consistency contract.
//!
//! ## Architecture
//!
//! ```text
//! stayforge-guard (policies)
//!     ↓ typed records (TypedStoreExt)
//! TimedKeyValueStore (trait)
//!     ↓
//! FallbackStore ── durable error? ──→ InMemoryStore
//!     ↓
//! DurableStore (REST key-value backend)
//! ```
//!
//! The durable backend is authoritative when reachable; any durable
//! operation that errors or times out is transparently retried against the
//! in-process map. Expiry is TTL-driven on the durable side and handled by
//! lazy reads plus the [`sweeper::RetentionSweeper`] on the memory side.

pub mod durable;
pub mod error;
pub mod fallback;
pub mod memory;
pub mod records;
pub mod store_trait;
pub mod sweeper;
pub mod test_utils;

pub use durable::DurableStore;
pub use error::{Result, StoreError};
pub use fallback::FallbackStore;
pub use memory::InMemoryStore;
pub use records::TypedStoreExt;
pub use store_trait::TimedKeyValueStore;
pub use sweeper::{RetentionSweeper, SweepRule, SweeperHandle};
