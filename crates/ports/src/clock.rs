//! Clock boundary contract.

use std::time::Instant;

/// Source of monotonic marks (durations) and wall-clock time (log stamps).
pub trait ClockPort: Send + Sync {
    /// Monotonic instant used for start/end marks.
    fn now(&self) -> Instant;

    /// Wall-clock milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> u64;
}
