//! Instrumented HTTP client over `reqwest`.
//!
//! Every exchange runs through the installed [`ExchangeHooks`]: the request hook
//! before dispatch, then either the response hook (2xx) or the error hook
//! (transport failure or a status outside 2xx).

use reqlens_config::HttpClientConfig;
use reqlens_ports::{ExchangeHooks, Headers, HttpError, HttpResponse, RequestConfig};
use reqlens_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Tracing target for client internals.
pub const TRACING_TARGET: &str = "reqlens_adapters::http_client";

/// Settings for [`InstrumentedClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentedClientConfig {
    /// Base URL joined with relative request URLs.
    pub base_url: Option<Url>,
    /// Whole-exchange timeout in milliseconds.
    pub timeout_ms: u64,
    /// `User-Agent` header value.
    pub user_agent: Box<str>,
}

impl InstrumentedClientConfig {
    /// Build client settings from validated configuration.
    #[must_use]
    pub fn from_http_config(config: &HttpClientConfig, base_url: Option<&Url>) -> Self {
        Self {
            base_url: base_url.cloned(),
            timeout_ms: config.timeout_ms,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// HTTP client that reports every exchange to its hooks.
#[derive(Clone)]
pub struct InstrumentedClient {
    client: reqwest::Client,
    base_url: Option<Url>,
    timeout_ms: u64,
    hooks: Arc<dyn ExchangeHooks>,
}

impl InstrumentedClient {
    /// Create a client with the given hooks installed.
    pub fn new(config: &InstrumentedClientConfig, hooks: Arc<dyn ExchangeHooks>) -> Result<Self> {
        if config.timeout_ms == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "timeout must be greater than zero",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.as_ref())
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("http", "client_init_failed"),
                    format!("failed to build HTTP client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            timeout_ms: config.timeout_ms,
            hooks,
        })
    }

    /// Installed hooks.
    #[must_use]
    pub fn hooks(&self) -> &Arc<dyn ExchangeHooks> {
        &self.hooks
    }

    /// Send a request through the hooks.
    ///
    /// A status outside 2xx is reported to the error hook and surfaces as
    /// [`HttpError`] unless the hook recovers it.
    pub async fn send(&self, request: RequestConfig) -> std::result::Result<HttpResponse, HttpError> {
        let request = self.hooks.on_request(request);
        match self.dispatch(&request).await {
            Ok(response) => Ok(self.hooks.on_response(response)),
            Err(error) => self.hooks.on_error(error),
        }
    }

    async fn dispatch(&self, request: &RequestConfig) -> std::result::Result<HttpResponse, HttpError> {
        let url = self.resolve_url(&request.url).map_err(|message| {
            HttpError::new(message)
                .with_code(HttpError::INVALID_REQUEST)
                .for_request(request)
        })?;
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            HttpError::new(format!("invalid HTTP method: {}", request.method))
                .with_code(HttpError::INVALID_REQUEST)
                .for_request(request)
        })?;

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request.id,
            method = %request.method,
            url = %request.url,
            "dispatching request"
        );

        let response = builder
            .send()
            .await
            .map_err(|error| self.map_reqwest_error(&error, request))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let headers = collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|error| self.map_reqwest_error(&error, request))?;

        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request.id,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "response received"
        );

        let response = HttpResponse {
            request_id: Some(request.id.clone()),
            url: final_url.into_boxed_str(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().into(),
            headers,
            data: decode_body(&body),
        };

        if status.is_success() {
            Ok(response)
        } else {
            Err(HttpError::from_status(response))
        }
    }

    fn resolve_url(&self, raw: &str) -> std::result::Result<Url, String> {
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self
                    .base_url
                    .as_ref()
                    .ok_or_else(|| format!("relative URL without base URL: {raw}"))?;
                let joined = format!(
                    "{}/{}",
                    base.as_str().trim_end_matches('/'),
                    raw.trim_start_matches('/')
                );
                Url::parse(&joined).map_err(|error| format!("invalid URL {joined}: {error}"))
            },
            Err(error) => Err(format!("invalid URL {raw}: {error}")),
        }
    }

    fn map_reqwest_error(&self, error: &reqwest::Error, request: &RequestConfig) -> HttpError {
        let (code, message) = if error.is_timeout() {
            (
                HttpError::TIMED_OUT,
                format!("timeout of {}ms exceeded", self.timeout_ms),
            )
        } else if error.is_builder() {
            (HttpError::INVALID_REQUEST, format!("invalid request: {error}"))
        } else if error.is_connect() {
            (HttpError::NETWORK, format!("Network Error: {error}"))
        } else {
            (HttpError::NETWORK, format!("request failed: {error}"))
        };
        tracing::warn!(
            target: TRACING_TARGET,
            request_id = %request.id,
            code,
            error = %error,
            "transport failure"
        );
        HttpError::new(message).with_code(code).for_request(request)
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> Headers {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

/// Empty bodies decode to `None`, JSON to a value, anything else to a string.
fn decode_body(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body)
        .ok()
        .or_else(|| Some(Value::String(String::from_utf8_lossy(body).into_owned())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct PassThrough;

    impl ExchangeHooks for PassThrough {
        fn on_request(&self, request: RequestConfig) -> RequestConfig {
            request
        }

        fn on_response(&self, response: HttpResponse) -> HttpResponse {
            response
        }

        fn on_error(&self, error: HttpError) -> std::result::Result<HttpResponse, HttpError> {
            Err(error)
        }
    }

    fn client(base_url: Option<&str>) -> Result<InstrumentedClient> {
        let base_url = base_url
            .map(Url::parse)
            .transpose()
            .map_err(|error| ErrorEnvelope::expected(ErrorCode::invalid_input(), error.to_string()))?;
        InstrumentedClient::new(
            &InstrumentedClientConfig {
                base_url,
                timeout_ms: 1_000,
                user_agent: "reqlens-test".into(),
            },
            Arc::new(PassThrough),
        )
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = InstrumentedClient::new(
            &InstrumentedClientConfig {
                base_url: None,
                timeout_ms: 0,
                user_agent: "reqlens-test".into(),
            },
            Arc::new(PassThrough),
        );
        assert!(matches!(result, Err(error) if error.code == ErrorCode::invalid_input()));
    }

    #[test]
    fn relative_urls_join_base_with_one_slash() -> Result<()> {
        let client = client(Some("https://api.example.com/v1/"))?;
        let joined = client.resolve_url("/courses/1");
        assert_eq!(
            joined.map(String::from).as_deref(),
            Ok("https://api.example.com/v1/courses/1")
        );
        Ok(())
    }

    #[test]
    fn absolute_urls_ignore_base() -> Result<()> {
        let client = client(Some("https://api.example.com"))?;
        let resolved = client.resolve_url("http://other.test/x");
        assert_eq!(resolved.map(String::from).as_deref(), Ok("http://other.test/x"));
        Ok(())
    }

    #[test]
    fn relative_url_without_base_is_an_error() -> Result<()> {
        let client = client(None)?;
        assert!(client.resolve_url("/courses").is_err());
        Ok(())
    }

    #[test]
    fn bodies_decode_as_json_or_text() {
        assert_eq!(decode_body(b""), None);
        assert_eq!(decode_body(br#"{"a":1}"#), Some(json!({"a": 1})));
        assert_eq!(decode_body(b"plain text"), Some(json!("plain text")));
    }
}
