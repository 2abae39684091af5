//! Arrival timestamps for new orders.
//!
//! Wall-clock time can step backwards (NTP slews, manual changes). Order
//! timestamps are clamped against a process-wide high-water mark so that two
//! orders created one after another never carry decreasing stamps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

/// Current time in nanoseconds since the Unix epoch, never lower than any
/// value previously returned in this process.
pub fn now_nanos() -> u64 {
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0);

    let previous = LAST_STAMP.fetch_max(wall, Ordering::AcqRel);
    previous.max(wall)
}
