//! HTTP exchange types and the interceptor installation contract.
//!
//! An HTTP client that supports instrumentation calls [`ExchangeHooks`] at three
//! lifecycle points: before dispatch, after a successful response, and after a
//! failure. Requests carry a [`RequestId`]; responses and errors name the id of
//! the request they originate from so hooks can correlate them without storing
//! anything on the request itself.

use reqlens_domain::ResponsePayload;
use reqlens_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestId};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Header map with lowercase names.
pub type Headers = BTreeMap<String, String>;

/// Outgoing request as seen by hooks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    /// Exchange id, generated at construction.
    pub id: RequestId,
    /// Uppercase HTTP method.
    pub method: Box<str>,
    /// Absolute or base-relative URL.
    pub url: Box<str>,
    /// Request headers.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: Headers,
    /// Optional JSON body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestConfig {
    /// Create a request with a fresh id.
    pub fn new(method: &str, url: impl Into<Box<str>>) -> Self {
        Self {
            id: RequestId::generate(),
            method: method.trim().to_ascii_uppercase().into_boxed_str(),
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(url: impl Into<Box<str>>) -> Self {
        Self::new("GET", url)
    }

    /// Attach a header (name stored lowercase).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Settled response in the generic `{status, statusText, data}` shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// Id of the originating request, when known.
    pub request_id: Option<RequestId>,
    /// URL the response came from.
    pub url: Box<str>,
    /// Status code.
    pub status: u16,
    /// Canonical reason phrase (may be empty).
    pub status_text: Box<str>,
    /// Response headers.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: Headers,
    /// Decoded payload. JSON bodies decode to values, other text to `Value::String`.
    pub data: Option<Value>,
}

impl HttpResponse {
    /// Top-level payload keys in payload order; empty for non-object payloads.
    #[must_use]
    pub fn data_keys(&self) -> Vec<String> {
        self.data
            .as_ref()
            .and_then(Value::as_object)
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl ResponsePayload for HttpResponse {
    fn payload(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}

/// Failure surfaced by an HTTP client, in the generic `{message, code, response:{status}}` shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct HttpError {
    /// Human-readable message.
    pub message: String,
    /// Client error code (see the associated constants).
    pub code: Option<Box<str>>,
    /// Response status, when the server answered.
    pub status: Option<u16>,
    /// Id of the originating request, when known.
    pub request_id: Option<RequestId>,
    /// Request URL, when known.
    pub url: Option<Box<str>>,
    /// Response payload of a rejected status, when decoded.
    pub data: Option<Value>,
}

impl HttpError {
    /// Server answered with a 4xx status.
    pub const BAD_REQUEST: &'static str = "ERR_BAD_REQUEST";
    /// Server answered with a 5xx status.
    pub const BAD_RESPONSE: &'static str = "ERR_BAD_RESPONSE";
    /// The request timed out.
    pub const TIMED_OUT: &'static str = "ETIMEDOUT";
    /// Connection could not be established or broke mid-flight.
    pub const NETWORK: &'static str = "ERR_NETWORK";
    /// The request could not be built (bad URL, bad header).
    pub const INVALID_REQUEST: &'static str = "ERR_INVALID_REQUEST";

    /// Create an error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            status: None,
            request_id: None,
            url: None,
            data: None,
        }
    }

    /// Error for a settled response whose status is outside 2xx.
    #[must_use]
    pub fn from_status(response: HttpResponse) -> Self {
        let code = if response.status >= 500 {
            Self::BAD_RESPONSE
        } else {
            Self::BAD_REQUEST
        };
        Self {
            message: format!("Request failed with status code {}", response.status),
            code: Some(code.into()),
            status: Some(response.status),
            request_id: response.request_id,
            url: Some(response.url),
            data: response.data,
        }
    }

    /// Set the client error code.
    #[must_use]
    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Correlate with the originating request.
    #[must_use]
    pub fn for_request(mut self, request: &RequestConfig) -> Self {
        self.request_id = Some(request.id.clone());
        self.url = Some(request.url.clone());
        self
    }

    fn is_retriable(&self) -> bool {
        matches!(self.status, Some(status) if status >= 500 || status == 429)
            || matches!(
                self.code.as_deref(),
                Some(Self::TIMED_OUT | Self::NETWORK)
            )
    }
}

impl From<HttpError> for ErrorEnvelope {
    fn from(error: HttpError) -> Self {
        let code = ErrorCode::http(
            error
                .code
                .as_deref()
                .map_or_else(|| "unknown".to_string(), str::to_ascii_lowercase),
        );
        let mut envelope = if error.is_retriable() {
            Self::unexpected(code, error.message.clone(), ErrorClass::Retriable)
        } else {
            Self::expected(code, error.message.clone())
        };
        if let Some(status) = error.status {
            envelope = envelope.with_metadata("status", status.to_string());
        }
        if let Some(url) = error.url {
            envelope = envelope.with_metadata("url", url);
        }
        if let Some(request_id) = error.request_id {
            envelope = envelope.with_metadata("requestId", request_id.as_str());
        }
        envelope
    }
}

/// Interceptor installation contract.
///
/// Hooks observe the exchange; they must hand back exactly what they received.
pub trait ExchangeHooks: Send + Sync {
    /// Called before dispatch. The client sends whatever this returns.
    fn on_request(&self, request: RequestConfig) -> RequestConfig;

    /// Called with a settled 2xx response. The client returns whatever this returns.
    fn on_response(&self, response: HttpResponse) -> HttpResponse;

    /// Called with a failure. `Err` re-signals the failure to the caller;
    /// `Ok` would recover it into a response.
    fn on_error(&self, error: HttpError) -> Result<HttpResponse, HttpError>;
}
