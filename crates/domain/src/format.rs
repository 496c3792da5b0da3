//! Pure formatting helpers for diagnostic output.
//!
//! Nothing in here logs or keeps state; callers that need failures reported
//! (size estimation) wrap these functions and log on their side.

use serde::Serialize;
use std::time::Duration;

/// Byte units in ascending order; values at or above 1024 GB stay in GB.
pub const BYTE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

const UNIT_STEP: u64 = 1024;
const MS_PER_DAY: u64 = 86_400_000;

/// Render a byte count with a human unit, rounded to two decimals.
///
/// The unit is the largest one whose scaled value is at least 1, clamped to GB.
/// Negative sizes are unrepresentable (`u64`).
///
/// ```
/// use reqlens_domain::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 Bytes");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(1024 * 1024), "1 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let (index, scale) = unit_for(bytes);
    #[allow(
        clippy::cast_precision_loss,
        reason = "display value rounded to two decimals"
    )]
    let scaled = bytes as f64 / scale as f64;
    let rounded = (scaled * 100.0).round() / 100.0;
    let unit = BYTE_UNITS.get(index).copied().unwrap_or("GB");
    format!("{rounded} {unit}")
}

/// Index into [`BYTE_UNITS`] and the divisor for `bytes` (`bytes > 0`).
fn unit_for(bytes: u64) -> (usize, u64) {
    let mut index = 0;
    let mut scale = 1_u64;
    while index + 1 < BYTE_UNITS.len() && bytes / scale >= UNIT_STEP {
        scale *= UNIT_STEP;
        index += 1;
    }
    (index, scale)
}

/// Serialize `value` as compact JSON and return the UTF-8 byte length.
///
/// Fails when the value cannot be represented as JSON (for example a map with
/// non-string keys).
pub fn try_estimate_size<T>(value: &T) -> Result<u64, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    let encoded = serde_json::to_vec(value)?;
    Ok(u64::try_from(encoded.len()).unwrap_or(u64::MAX))
}

/// Render the time-of-day portion of an ISO-8601 UTC timestamp (`HH:MM:SS.mmmZ`).
///
/// ```
/// use reqlens_domain::format_time_of_day;
///
/// assert_eq!(format_time_of_day(0), "00:00:00.000Z");
/// assert_eq!(format_time_of_day(45_296_789), "12:34:56.789Z");
/// ```
pub fn format_time_of_day(epoch_ms: u64) -> String {
    let ms_of_day = epoch_ms % MS_PER_DAY;
    let hours = ms_of_day / 3_600_000;
    let minutes = (ms_of_day / 60_000) % 60;
    let seconds = (ms_of_day / 1_000) % 60;
    let millis = ms_of_day % 1_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}Z")
}

/// Round a duration to the nearest whole millisecond (half rounds up).
pub fn round_millis(duration: Duration) -> u64 {
    let rounded = (duration.as_nanos() + 500_000) / 1_000_000;
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

/// Render a millisecond count the way timing lines show it (`"120ms"`).
pub fn format_millis(ms: u64) -> String {
    format!("{ms}ms")
}

/// First `max_chars` characters of `text` (character boundaries, not bytes).
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
