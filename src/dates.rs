//! Legacy timestamp conversion.
//!
//! Catalog dates are unsigned 32-bit second counts from 1904-01-01 00:00:00. HFS wrote them
//! in local time and HFS+ in GMT; neither records which zone, so both are read as UTC.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Seconds between 1904-01-01 and 1970-01-01.
pub const LEGACY_EPOCH_OFFSET: i64 = 2_082_844_800;

/// Convert a catalog timestamp to an absolute time.
pub fn from_legacy_timestamp(seconds: u32) -> DateTime<Utc> {
    legacy_epoch() + Duration::seconds(seconds as i64)
}

/// Convert an absolute time back to a catalog timestamp, clamped to the representable range.
pub fn to_legacy_timestamp(date: DateTime<Utc>) -> u32 {
    let seconds = date.timestamp() + LEGACY_EPOCH_OFFSET;
    seconds.clamp(0, u32::MAX as i64) as u32
}

fn legacy_epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(-LEGACY_EPOCH_OFFSET, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
