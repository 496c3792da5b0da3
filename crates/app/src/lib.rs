//! # reqlens-app
//!
//! Diagnostics facade and interceptor factory.
//! This crate depends on `ports`, `domain`, and `shared`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod diagnostics;
pub mod error_details;
pub mod interceptor;
pub mod parsing;

pub use diagnostics::{Diagnostics, DiagnosticsDeps, DiagnosticsOptions, JSON_PARSE_TIMER};
pub use error_details::ErrorDetails;
pub use interceptor::{Interceptor, InterceptorContext};
pub use parsing::{JsonInput, ParseFailure, ParseOutcome};
