//! Facade and interceptor exercised together, across threads.

use reqlens_app::{Diagnostics, DiagnosticsDeps, DiagnosticsOptions};
use reqlens_ports::{
    ClockPort, ExchangeHooks, Headers, HttpError, HttpResponse, LogEvent, LoggerPort,
    RequestConfig,
};
use serde_json::json;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Default)]
struct CapturingLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl CapturingLogger {
    fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|event| event.message.to_string())
            .collect()
    }
}

impl LoggerPort for CapturingLogger {
    fn log(&self, event: LogEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Every read advances the clock by one millisecond.
struct TickingClock {
    base: Instant,
    ticks: AtomicU64,
}

impl ClockPort for TickingClock {
    fn now(&self) -> Instant {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.base + Duration::from_millis(tick)
    }

    fn epoch_ms(&self) -> u64 {
        1_700_000_000_000
    }
}

fn diagnostics(label: &str) -> (Diagnostics, Arc<CapturingLogger>) {
    let logger = Arc::new(CapturingLogger::default());
    let diagnostics = Diagnostics::new(
        DiagnosticsOptions {
            label: label.into(),
            ..DiagnosticsOptions::default()
        },
        DiagnosticsDeps {
            logger: logger.clone(),
            clock: Arc::new(TickingClock {
                base: Instant::now(),
                ticks: AtomicU64::new(0),
            }),
        },
    );
    (diagnostics, logger)
}

#[test]
fn hooks_can_run_on_many_threads() -> Result<(), Box<dyn Error>> {
    let (diagnostics, logger) = diagnostics("Worker");
    let hooks: Arc<dyn ExchangeHooks> = Arc::new(diagnostics.create_interceptor());

    let handles: Vec<_> = (0..8)
        .map(|index| {
            let hooks = Arc::clone(&hooks);
            thread::spawn(move || {
                let request = hooks.on_request(RequestConfig::get(format!("/items/{index}")));
                if index % 2 == 0 {
                    let response = HttpResponse {
                        request_id: Some(request.id.clone()),
                        url: request.url.clone(),
                        status: 200,
                        status_text: "OK".into(),
                        headers: Headers::new(),
                        data: Some(json!({ "index": index })),
                    };
                    hooks.on_response(response).status
                } else {
                    let error = HttpError::new("Request failed with status code 503")
                        .with_code(HttpError::BAD_RESPONSE)
                        .for_request(&request);
                    hooks.on_error(error).map_or(0, |response| response.status)
                }
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(
            handle
                .join()
                .map_err(|_| std::io::Error::other("worker panicked"))?,
        );
    }

    assert_eq!(statuses.iter().filter(|status| **status == 200).count(), 4);
    assert_eq!(statuses.iter().filter(|status| **status == 0).count(), 4);
    assert_eq!(diagnostics.pending_exchanges(), 0);

    let messages = logger.messages();
    assert_eq!(messages.len(), 16);
    assert_eq!(
        messages
            .iter()
            .filter(|message| message.starts_with("Request failed after "))
            .count(),
        4
    );
    Ok(())
}

#[test]
fn fetch_flow_produces_summary_and_verdict() -> Result<(), Box<dyn Error>> {
    let (diagnostics, logger) = diagnostics("CourseGenerator");
    let hooks = diagnostics.create_interceptor();

    diagnostics.start_timing("load-course");
    let request = hooks.on_request(RequestConfig::get("/courses/1"));
    let response = hooks.on_response(HttpResponse {
        request_id: Some(request.id.clone()),
        url: "/courses/1".into(),
        status: 200,
        status_text: "OK".into(),
        headers: Headers::new(),
        data: Some(json!({ "title": "Rust", "summary": null })),
    });
    let verdict = diagnostics.validate_response(Some(&response), &["title", "summary"]);
    let elapsed = diagnostics.end_timing("load-course");

    assert!(verdict.valid());
    assert_eq!(verdict.warnings(), ["Field summary is null or undefined"]);
    assert!(elapsed.is_some());
    assert_eq!(
        serde_json::to_value(diagnostics.timing_summary())?
            .as_object()
            .map(|summary| summary.contains_key("load-course")),
        Some(true)
    );
    assert_eq!(
        logger.messages(),
        [
            "Started: load-course",
            "GET /courses/1",
            "Response from /courses/1",
            "Response validation warnings",
            format!("Completed: load-course ({}ms)", elapsed.unwrap_or_default()).as_str(),
        ]
    );
    Ok(())
}
