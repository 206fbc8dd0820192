//! Webhook nonce format: `"<epoch_millis>_<32 lowercase hex chars>"`.
//!
//! The timestamp half feeds the same freshness validation as provider
//! timestamps; the hex half comes from the OS random source.

use stayforge_commons::now_millis;
use uuid::Uuid;

/// Mint a fresh single-use nonce.
pub fn generate_webhook_nonce() -> String {
    format!("{}_{}", now_millis(), Uuid::new_v4().simple())
}

/// Parsed halves of a well-formed nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NonceParts {
    pub timestamp: i64,
}

/// Parse and shape-check a nonce. Returns `None` for anything malformed:
/// missing separator, wrong hex length, non-hex characters, uppercase hex,
/// or a non-numeric timestamp.
pub(crate) fn parse_nonce(nonce: &str) -> Option<NonceParts> {
    let (ts_part, hex_part) = nonce.split_once('_')?;

    if hex_part.len() != 32
        || !hex_part
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    {
        return None;
    }

    if ts_part.is_empty() || !ts_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let timestamp = ts_part.parse::<i64>().ok()?;

    Some(NonceParts { timestamp })
}
