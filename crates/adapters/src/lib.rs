//! # reqlens-adapters
//!
//! Adapter implementations for ports (log sinks, loggers, clock, HTTP client).
//! This crate depends on `ports`, `domain`, `config`, and `shared`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod clock;
pub mod http_client;
pub mod log_sink;
pub mod logger;

pub use clock::SystemClock;
pub use http_client::{InstrumentedClient, InstrumentedClientConfig};
pub use log_sink::{LogSink, MemoryLogSink, StderrLogSink};
pub use logger::{ConsoleLogger, JsonLogger, render_console_line};
