//! # reqlens-domain
//!
//! Pure instrumentation logic with no I/O:
//!
//! - **Format** - byte sizes, time-of-day stamps, millisecond rounding
//! - **Timing** - `TimingEntry`, `TimingRegistry`, `TimingSummary`
//! - **Validation** - `ValidationVerdict` and the three-tier `validate_response`
//!
//! ## Dependency Rules
//!
//! - No workspace dependencies
//! - No logging: callers decide how findings are reported

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod format;
pub mod timing;
pub mod validation;

pub use format::{
    BYTE_UNITS, format_bytes, format_millis, format_time_of_day, round_millis,
    truncate_preview, try_estimate_size,
};
pub use timing::{TimingEntry, TimingRegistry, TimingSummary};
pub use validation::{
    MISSING_PAYLOAD, MISSING_RESPONSE, ResponsePayload, ValidationVerdict, validate_response,
};
