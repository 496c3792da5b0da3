//! # reqlens-ports
//!
//! Port traits for the reqlens hexagonal architecture.
//!
//! This crate defines the interfaces between the instrumentation core and its
//! collaborators: the log stream, the clock, and the HTTP client that installs
//! the interceptor hooks. It depends only on `domain` and `shared`.

pub mod clock;
pub mod exchange;
pub mod logger;

pub use clock::ClockPort;
pub use exchange::{ExchangeHooks, Headers, HttpError, HttpResponse, RequestConfig};
pub use logger::{LogEvent, LogLevel, LoggerPort, tags};

// Re-exported so adapters can implement ports without depending on `domain` or `shared`.
pub use reqlens_domain::ResponsePayload;
pub use reqlens_shared::RequestId;
