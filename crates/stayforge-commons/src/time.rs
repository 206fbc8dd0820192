//! Wall-clock helper.
//!
//! All records in the protection core carry Unix timestamps in milliseconds,
//! produced by this single helper so tests and call sites agree on the unit.

use chrono::Utc;

/// Current Unix timestamp in milliseconds.
#[inline]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
