//! Diagnostics facade.
//!
//! One [`Diagnostics`] instance owns its label, its timer registry, and its
//! in-flight exchange map. Clones share that state; separately constructed
//! instances never do.

use crate::error_details::ErrorDetails;
use crate::interceptor::{Interceptor, InterceptorContext};
use crate::parsing::{JsonInput, ParseFailure, ParseOutcome};
use reqlens_domain::{
    ResponsePayload, TimingEntry, TimingRegistry, TimingSummary, ValidationVerdict, format_bytes,
    format_millis, round_millis, truncate_preview, try_estimate_size, validate_response,
};
use reqlens_ports::{ClockPort, HttpResponse, LogEvent, LogLevel, LoggerPort, RequestId, tags};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Timer name reserved for [`Diagnostics::log_json_parsing`].
pub const JSON_PARSE_TIMER: &str = "JSON_PARSE";

/// Construction-time settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsOptions {
    /// Label printed on every line.
    pub label: Box<str>,
    /// Initial state of the runtime toggle.
    pub enabled: bool,
    /// Characters kept in parse-failure previews.
    pub preview_chars: usize,
}

impl Default for DiagnosticsOptions {
    fn default() -> Self {
        Self {
            label: "App".into(),
            enabled: true,
            preview_chars: 100,
        }
    }
}

/// Collaborators required by the facade.
#[derive(Clone)]
pub struct DiagnosticsDeps {
    /// Log stream.
    pub logger: Arc<dyn LoggerPort>,
    /// Monotonic and wall clock.
    pub clock: Arc<dyn ClockPort>,
}

/// Labeled diagnostics scope.
#[derive(Clone)]
pub struct Diagnostics {
    inner: Arc<DiagnosticsInner>,
}

struct DiagnosticsInner {
    label: Box<str>,
    enabled: AtomicBool,
    preview_chars: usize,
    timings: Mutex<TimingRegistry>,
    exchanges: Mutex<HashMap<RequestId, InterceptorContext>>,
    logger: Arc<dyn LoggerPort>,
    clock: Arc<dyn ClockPort>,
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Diagnostics")
            .field("label", &self.inner.label)
            .field("enabled", &self.is_enabled())
            .field("pending_exchanges", &self.pending_exchanges())
            .finish_non_exhaustive()
    }
}

// Registry and exchange map hold plain data, so a panic elsewhere cannot leave
// them half-updated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn to_data<T: Serialize + ?Sized>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

impl Diagnostics {
    /// Build a facade.
    #[must_use]
    pub fn new(options: DiagnosticsOptions, deps: DiagnosticsDeps) -> Self {
        Self {
            inner: Arc::new(DiagnosticsInner {
                label: options.label,
                enabled: AtomicBool::new(options.enabled),
                preview_chars: options.preview_chars,
                timings: Mutex::new(TimingRegistry::new()),
                exchanges: Mutex::new(HashMap::new()),
                logger: deps.logger,
                clock: deps.clock,
            }),
        }
    }

    /// Context label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Whether [`Self::log`] emits anything.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Relaxed)
    }

    /// Flip the runtime toggle. Timers and exchange tracking keep working while disabled.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Emit one line: time, tag, label, message, and `data` when present.
    pub fn log(&self, tag: &str, message: impl Into<String>, data: Option<Value>) {
        if !self.is_enabled() {
            return;
        }
        self.inner.logger.log(LogEvent {
            timestamp_ms: self.inner.clock.epoch_ms(),
            level: LogLevel::for_tag(tag),
            tag: tag.into(),
            label: self.inner.label.clone(),
            message: message.into().into_boxed_str(),
            data,
        });
    }

    /// `<METHOD> <url>` line with the request body as data.
    pub fn log_request(&self, method: &str, url: &str, body: Option<&Value>) {
        self.log(tags::REQUEST, format!("{method} {url}"), body.cloned());
    }

    /// Response summary: status, status text, duration, payload size, payload keys.
    pub fn log_response(&self, url: &str, response: &HttpResponse, duration_ms: u64) {
        let size = response
            .data
            .as_ref()
            .map_or(0, |data| self.estimate_size(data));
        self.log(
            tags::RESPONSE,
            format!("Response from {url}"),
            Some(json!({
                "status": response.status,
                "statusText": response.status_text,
                "duration": format_millis(duration_ms),
                "size": format_bytes(size),
                "dataKeys": response.data_keys(),
            })),
        );
    }

    /// Start (or restart) the timer for `operation_name`.
    pub fn start_timing(&self, operation_name: &str) {
        let now = self.inner.clock.now();
        lock(&self.inner.timings).start(operation_name, now);
        self.log(tags::TIMER, format!("Started: {operation_name}"), None);
    }

    /// Stop the timer for `operation_name` and return its rounded duration.
    ///
    /// Returns `None` and logs a warning when the timer was never started.
    pub fn end_timing(&self, operation_name: &str) -> Option<u64> {
        let now = self.inner.clock.now();
        let duration_ms = lock(&self.inner.timings)
            .finish(operation_name, now)
            .and_then(TimingEntry::duration_ms);

        match duration_ms {
            Some(ms) => self.log(
                tags::SUCCESS,
                format!("Completed: {operation_name} ({ms}ms)"),
                None,
            ),
            None => self.log(
                tags::WARNING,
                format!("No timing found for: {operation_name}"),
                None,
            ),
        }
        duration_ms
    }

    /// Snapshot of the entry for `operation_name`.
    #[must_use]
    pub fn get_timing(&self, operation_name: &str) -> Option<TimingEntry> {
        lock(&self.inner.timings).get(operation_name).cloned()
    }

    /// Completed timers in first-start order.
    #[must_use]
    pub fn timing_summary(&self) -> TimingSummary {
        lock(&self.inner.timings).summary()
    }

    /// Drop every timer, completed or not.
    pub fn clear_timings(&self) {
        lock(&self.inner.timings).clear();
    }

    /// Validate `response` and emit exactly one line describing the verdict.
    pub fn validate_response<R, F>(
        &self,
        response: Option<&R>,
        required_fields: &[F],
    ) -> ValidationVerdict
    where
        R: ResponsePayload + ?Sized,
        F: AsRef<str>,
    {
        let verdict = validate_response(response, required_fields);
        if !verdict.valid() {
            self.log(tags::FAILURE, "Response validation failed", to_data(&verdict));
        } else if verdict.has_warnings() {
            self.log(tags::WARNING, "Response validation warnings", to_data(&verdict));
        } else {
            self.log(tags::SUCCESS, "Response validation passed", None);
        }
        verdict
    }

    /// Serialized byte length of `value`, or `0` (with a warning line) when it
    /// cannot be serialized.
    pub fn estimate_size<T>(&self, value: &T) -> u64
    where
        T: Serialize + ?Sized,
    {
        match try_estimate_size(value) {
            Ok(size) => size,
            Err(error) => {
                self.log(
                    tags::WARNING,
                    "Failed to estimate size",
                    to_data(&ErrorDetails::from(&error)),
                );
                0
            },
        }
    }

    /// Log a `{from, to, changed}` record.
    ///
    /// `changed` is identity inequality for arrays and objects (two references
    /// to distinct values differ even when their contents are equal) and value
    /// inequality for scalars.
    pub fn log_state_update(&self, state_name: &str, old_value: &Value, new_value: &Value) {
        self.log(
            tags::STATE,
            format!("State Update: {state_name}"),
            Some(json!({
                "from": old_value,
                "to": new_value,
                "changed": strictly_differs(old_value, new_value),
            })),
        );
    }

    /// Log message, kind, and trace of `error` with an optional context map.
    pub fn log_error(&self, error: impl Into<ErrorDetails>, context: Option<Value>) {
        let details = error.into();
        self.log(
            tags::ERROR,
            "ERROR OCCURRED",
            Some(json!({
                "message": details.message,
                "name": details.name,
                "stack": details.stack,
                "context": context.unwrap_or_else(|| json!({})),
            })),
        );
    }

    /// Parse `input` under the [`JSON_PARSE_TIMER`] timer.
    ///
    /// Structured input passes through unchanged. Parse failures are logged with
    /// a truncated preview of the text and returned as [`ParseOutcome::Failure`].
    pub fn log_json_parsing(&self, input: impl Into<JsonInput>) -> ParseOutcome {
        let input = input.into();
        let kind = input.kind();
        self.start_timing(JSON_PARSE_TIMER);

        let parsed = match input {
            JsonInput::Structured(value) => Ok(value),
            JsonInput::Text(text) => {
                serde_json::from_str::<Value>(&text).map_err(|error| (error, text))
            },
        };
        self.end_timing(JSON_PARSE_TIMER);

        match parsed {
            Ok(value) => {
                let size = self.estimate_size(&value);
                self.log(
                    tags::SUCCESS,
                    "JSON parsing successful",
                    Some(json!({ "type": kind, "size": format_bytes(size) })),
                );
                ParseOutcome::Success(value)
            },
            Err((error, text)) => {
                let preview = truncate_preview(&text, self.inner.preview_chars);
                self.log_error(&error, Some(json!({ "dataPreview": preview })));
                ParseOutcome::Failure(ParseFailure {
                    message: error.to_string(),
                    line: error.line(),
                    column: error.column(),
                    preview,
                })
            },
        }
    }

    /// Interceptor hooks bound to this facade.
    #[must_use]
    pub fn create_interceptor(&self) -> Interceptor {
        Interceptor::new(self.clone())
    }

    /// Exchanges whose request was seen but whose response or error was not.
    #[must_use]
    pub fn pending_exchanges(&self) -> usize {
        lock(&self.inner.exchanges).len()
    }

    pub(crate) fn now(&self) -> Instant {
        self.inner.clock.now()
    }

    pub(crate) fn elapsed_ms(&self, start_mark: Instant) -> u64 {
        round_millis(self.now().saturating_duration_since(start_mark))
    }

    pub(crate) fn track_exchange(&self, context: InterceptorContext) {
        lock(&self.inner.exchanges).insert(context.id().clone(), context);
    }

    pub(crate) fn take_exchange(&self, id: Option<&RequestId>) -> Option<InterceptorContext> {
        let id = id?;
        lock(&self.inner.exchanges).remove(id)
    }
}

fn strictly_differs(old_value: &Value, new_value: &Value) -> bool {
    match (old_value, new_value) {
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
            !std::ptr::eq(old_value, new_value)
        },
        _ => old_value != new_value,
    }
}
