//! Structured logging boundary contract.

use serde::Serialize;
use serde_json::Value;

/// Fixed tag vocabulary used by the diagnostics facade.
pub mod tags {
    /// Timer started.
    pub const TIMER: &str = "⏱️";
    /// Operation or check succeeded.
    pub const SUCCESS: &str = "✅";
    /// Non-fatal anomaly.
    pub const WARNING: &str = "⚠️";
    /// Failed check or failed exchange.
    pub const FAILURE: &str = "❌";
    /// Outgoing request.
    pub const REQUEST: &str = "📡";
    /// Incoming response.
    pub const RESPONSE: &str = "📥";
    /// State transition.
    pub const STATE: &str = "🔄";
    /// Error report.
    pub const ERROR: &str = "💥";
}

/// Log level. Derived from the tag; used to annotate output, never to filter it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Info.
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

impl LogLevel {
    /// Level implied by a tag from [`tags`]; unknown tags are informational.
    #[must_use]
    pub fn for_tag(tag: &str) -> Self {
        match tag {
            tags::WARNING => Self::Warn,
            tags::FAILURE | tags::ERROR => Self::Error,
            _ => Self::Info,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// One diagnostic line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    /// Wall-clock time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Severity annotation.
    pub level: LogLevel,
    /// Tag (usually one of [`tags`]).
    pub tag: Box<str>,
    /// Label of the emitting facade.
    pub label: Box<str>,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional structured payload.
    pub data: Option<Value>,
}

/// Boundary contract for diagnostic logging.
pub trait LoggerPort: Send + Sync {
    /// Emit one event. Implementations must not panic or fail the caller.
    fn log(&self, event: LogEvent);
}
