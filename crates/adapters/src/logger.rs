//! Logger adapters: human-readable console lines and structured JSON lines.

use crate::log_sink::LogSink;
use reqlens_domain::format_time_of_day;
use reqlens_ports::{LogEvent, LoggerPort};
use reqlens_shared::{REDACTED, is_secret_key};
use serde_json::Value;
use std::sync::Arc;

/// Console logger: `[HH:MM:SS.mmmZ] <tag> [<label>] <message> <data>`.
#[derive(Clone)]
pub struct ConsoleLogger {
    sink: Arc<dyn LogSink>,
}

impl ConsoleLogger {
    /// Create a console logger backed by the provided sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl LoggerPort for ConsoleLogger {
    fn log(&self, event: LogEvent) {
        self.sink.write_line(&render_console_line(&event));
    }
}

/// Render one console line, trailing newline included.
#[must_use]
pub fn render_console_line(event: &LogEvent) -> String {
    let mut line = format!(
        "[{}] {} [{}] {}",
        format_time_of_day(event.timestamp_ms),
        event.tag,
        event.label,
        event.message
    );
    if let Some(data) = &event.data {
        line.push(' ');
        line.push_str(&serde_json::to_string(data).unwrap_or_else(|_| "<unprintable>".into()));
    }
    line.push('\n');
    line
}

/// JSON logger emitting one object per event, with secret-looking keys redacted.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
}

impl JsonLogger {
    /// Create a JSON logger backed by the provided sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        let mut payload = serde_json::Map::new();
        payload.insert("timestampMs".to_string(), Value::from(event.timestamp_ms));
        payload.insert(
            "time".to_string(),
            Value::String(format_time_of_day(event.timestamp_ms)),
        );
        payload.insert(
            "level".to_string(),
            Value::String(event.level.as_str().to_string()),
        );
        payload.insert("tag".to_string(), Value::String(event.tag.into_string()));
        payload.insert(
            "label".to_string(),
            Value::String(event.label.into_string()),
        );
        payload.insert(
            "message".to_string(),
            Value::String(event.message.into_string()),
        );
        if let Some(mut data) = event.data {
            redact_value(&mut data);
            payload.insert("data".to_string(), data);
        }

        let line = serde_json::to_string(&Value::Object(payload)).map_or_else(
            |_| {
                "{\"timestampMs\":0,\"level\":\"error\",\"tag\":\"💥\",\"message\":\"log serialization failed\"}\n"
                    .to_string()
            },
            |mut encoded| {
                encoded.push('\n');
                encoded
            },
        );
        self.sink.write_line(&line);
    }
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                if is_secret_key(key) {
                    *nested = Value::String(REDACTED.to_string());
                } else {
                    redact_value(nested);
                }
            }
        },
        Value::Array(items) => {
            for item in items {
                redact_value(item);
            }
        },
        _ => {},
    }
}
