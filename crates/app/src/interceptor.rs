//! Interceptor factory output: request, response, and error hooks.
//!
//! Exchange state lives in the owning facade, keyed by [`RequestId`]. The request
//! hook stamps each dispatch with a fresh id; responses and errors pass through
//! untouched.

use crate::diagnostics::Diagnostics;
use reqlens_ports::{ExchangeHooks, HttpError, HttpResponse, RequestConfig, RequestId, tags};
use serde_json::json;
use std::time::Instant;

/// Side-channel record of one in-flight exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptorContext {
    id: RequestId,
    start_mark: Instant,
    method: Box<str>,
    url: Box<str>,
}

impl InterceptorContext {
    /// Exchange id.
    #[must_use]
    pub const fn id(&self) -> &RequestId {
        &self.id
    }

    /// Monotonic mark taken when the request was observed.
    #[must_use]
    pub const fn start_mark(&self) -> Instant {
        self.start_mark
    }

    /// Request method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request URL as the caller supplied it.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Hooks bound to one [`Diagnostics`] facade.
#[derive(Debug, Clone)]
pub struct Interceptor {
    diagnostics: Diagnostics,
}

impl Interceptor {
    pub(crate) fn new(diagnostics: Diagnostics) -> Self {
        Self { diagnostics }
    }
}

impl ExchangeHooks for Interceptor {
    fn on_request(&self, mut request: RequestConfig) -> RequestConfig {
        // Cloned templates share an id; every dispatch needs its own.
        request.id = RequestId::generate();
        self.diagnostics.track_exchange(InterceptorContext {
            id: request.id.clone(),
            start_mark: self.diagnostics.now(),
            method: request.method.clone(),
            url: request.url.clone(),
        });
        self.diagnostics
            .log_request(&request.method, &request.url, request.body.as_ref());
        request
    }

    fn on_response(&self, response: HttpResponse) -> HttpResponse {
        let context = self
            .diagnostics
            .take_exchange(response.request_id.as_ref());
        let duration_ms = context
            .as_ref()
            .map_or(0, |context| self.diagnostics.elapsed_ms(context.start_mark));
        let url = context.as_ref().map_or(&*response.url, InterceptorContext::url);

        self.diagnostics.log_response(url, &response, duration_ms);
        response
    }

    fn on_error(&self, error: HttpError) -> Result<HttpResponse, HttpError> {
        match self.diagnostics.take_exchange(error.request_id.as_ref()) {
            Some(context) => {
                let duration_ms = self.diagnostics.elapsed_ms(context.start_mark);
                self.diagnostics.log(
                    tags::FAILURE,
                    format!("Request failed after {duration_ms}ms"),
                    Some(json!({
                        "url": context.url,
                        "message": error.message,
                        "code": error.code,
                        "status": error.status,
                    })),
                );
            },
            None => self.diagnostics.log_error(&error, None),
        }
        Err(error)
    }
}
