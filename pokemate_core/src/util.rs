//! Clock helpers shared across extraction and scheduling.

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// IST offset from UTC in seconds (+05:30).
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// The reference timezone for every captured timestamp, spawn expiry
/// check, and reminder schedule.
#[must_use]
pub fn ist_offset() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current wall-clock time in IST.
#[must_use]
pub fn ist_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&ist_offset())
}
