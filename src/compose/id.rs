//! Template id generation.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh opaque id for a template derived from `seed`.
///
/// Format: `tpl_{timestamp_ms}_{16 hex chars}`. The hex part hashes the
/// seed, the timestamp and a process-wide counter, so ids minted in the
/// same millisecond from the same seed still differ.
pub fn generate_id(seed: &str, now: DateTime<Utc>) -> String {
    let sequence = COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(now.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    let digest = hasher.finalize();

    format!("tpl_{}_{}", now.timestamp_millis(), hex::encode(&digest[..8]))
}

/// Check whether a string looks like a generated id.
pub fn is_generated_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix("tpl_") else {
        return false;
    };
    let Some((millis, random)) = rest.split_once('_') else {
        return false;
    };
    millis.parse::<i64>().is_ok()
        && random.len() == 16
        && random.chars().all(|c| c.is_ascii_hexdigit())
}
