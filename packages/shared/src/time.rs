//! Time-related utilities for displaying server timestamps.

use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};

const JST_OFFSET_SECS: i32 = 9 * 3600;

fn jst() -> FixedOffset {
    // JST is UTC+9; the offset is always in range
    FixedOffset::east_opt(JST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Get the current time as a JST RFC 3339 string (seconds precision)
pub fn now_jst_rfc3339() -> String {
    Utc::now()
        .with_timezone(&jst())
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Convert a server-assigned RFC 3339 timestamp to JST for display.
///
/// Returns `None` when the input is not a valid RFC 3339 timestamp so the
/// caller can fall back to the raw value.
pub fn rfc3339_to_jst(timestamp: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(timestamp).ok().map(|dt| {
        dt.with_timezone(&jst())
            .to_rfc3339_opts(SecondsFormat::Secs, false)
    })
}
