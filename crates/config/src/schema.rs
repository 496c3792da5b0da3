//! Diagnostics configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Normalization trims string fields before they are checked.

use reqlens_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use url::Url;

/// Strips credentials from a URL before it is echoed in an error.
fn sanitize_url_for_error(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() || !parsed.username().is_empty() {
                if parsed.set_username("").is_err() {
                    return "[invalid url: invalid username]".to_string();
                }
                if parsed.set_password(None).is_err() {
                    return "[invalid url: invalid password]".to_string();
                }
            }
            parsed.to_string()
        },
        Err(error) => format!("[invalid url: {error}]"),
    }
}

/// Default facade label.
pub const DEFAULT_LABEL: &str = "App";
/// Default parse-failure preview length, in characters.
pub const DEFAULT_PREVIEW_CHARS: u32 = 100;
/// Default HTTP timeout in milliseconds.
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

const PREVIEW_CHARS_MIN: u32 = 1;
const PREVIEW_CHARS_MAX: u32 = 10_000;
const HTTP_TIMEOUT_MIN_MS: u64 = 1;
const HTTP_TIMEOUT_MAX_MS: u64 = 600_000;

/// Output format of the diagnostics log sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `[time] <tag> [<label>] <message> <data>` lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parse a case-insensitive format name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

/// Top-level diagnostics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DiagnosticsConfig {
    /// Context label printed on every log line.
    pub label: Box<str>,
    /// Runtime logging toggle.
    pub enabled: bool,
    /// Log line format.
    pub log_format: LogFormat,
    /// Characters of raw input kept in parse-failure previews.
    pub preview_chars: u32,
    /// Instrumented HTTP client settings.
    pub http: HttpClientConfig,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.into(),
            enabled: true,
            log_format: LogFormat::default(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
            http: HttpClientConfig::default(),
        }
    }
}

/// Settings for the instrumented HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct HttpClientConfig {
    /// Base URL joined with relative request paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Box<str>>,
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// `User-Agent` header value.
    pub user_agent: Box<str>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            user_agent: default_user_agent().into(),
        }
    }
}

fn default_user_agent() -> String {
    format!("reqlens/{}", env!("CARGO_PKG_VERSION"))
}

impl DiagnosticsConfig {
    /// Trim string fields, then check every bound.
    pub fn validate_and_normalize(
        mut self,
    ) -> Result<ValidatedDiagnosticsConfig, ConfigSchemaError> {
        self.normalize();

        if self.label.is_empty() {
            return Err(ConfigSchemaError::EmptyField {
                section: "root",
                field: "label",
            });
        }
        check_range(
            "root",
            "previewChars",
            u64::from(self.preview_chars),
            u64::from(PREVIEW_CHARS_MIN),
            u64::from(PREVIEW_CHARS_MAX),
        )?;

        let base_url = self.http.validate()?;
        Ok(ValidatedDiagnosticsConfig {
            raw: self,
            base_url,
        })
    }

    fn normalize(&mut self) {
        self.label = self.label.trim().into();
        self.http.base_url = self
            .http
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(Into::into);
        self.http.user_agent = self.http.user_agent.trim().into();
    }
}

impl HttpClientConfig {
    fn validate(&self) -> Result<Option<Url>, ConfigSchemaError> {
        check_range(
            "http",
            "timeoutMs",
            self.timeout_ms,
            HTTP_TIMEOUT_MIN_MS,
            HTTP_TIMEOUT_MAX_MS,
        )?;
        if self.user_agent.is_empty() {
            return Err(ConfigSchemaError::EmptyField {
                section: "http",
                field: "userAgent",
            });
        }

        let Some(raw) = self.base_url.as_deref() else {
            return Ok(None);
        };
        let url = Url::parse(raw).map_err(|error| ConfigSchemaError::InvalidUrl {
            section: "http",
            field: "baseUrl",
            value: sanitize_url_for_error(raw),
            reason: error.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigSchemaError::InvalidUrl {
                section: "http",
                field: "baseUrl",
                value: sanitize_url_for_error(raw),
                reason: "scheme must be http or https".to_string(),
            });
        }
        Ok(Some(url))
    }
}

fn check_range(
    section: &'static str,
    field: &'static str,
    value: u64,
    min: u64,
    max: u64,
) -> Result<(), ConfigSchemaError> {
    if value < min || value > max {
        return Err(ConfigSchemaError::OutOfRange {
            section,
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Validated config wrapper carrying the parsed base URL.
#[derive(Debug, Clone)]
pub struct ValidatedDiagnosticsConfig {
    raw: DiagnosticsConfig,
    base_url: Option<Url>,
}

impl ValidatedDiagnosticsConfig {
    /// Parsed `http.baseUrl`, if configured.
    #[must_use]
    pub const fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &DiagnosticsConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> DiagnosticsConfig {
        self.raw
    }
}

impl AsRef<DiagnosticsConfig> for ValidatedDiagnosticsConfig {
    fn as_ref(&self) -> &DiagnosticsConfig {
        &self.raw
    }
}

impl Deref for ValidatedDiagnosticsConfig {
    type Target = DiagnosticsConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Parse and validate a JSON config document.
pub fn parse_diagnostics_config_json(
    input: &str,
) -> Result<ValidatedDiagnosticsConfig, ErrorEnvelope> {
    let config: DiagnosticsConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(Into::into)
}

/// Parse and validate a TOML config document.
pub fn parse_diagnostics_config_toml(
    input: &str,
) -> Result<ValidatedDiagnosticsConfig, ErrorEnvelope> {
    let config: DiagnosticsConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(Into::into)
}

/// Semantic validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// A string field is empty after trimming.
    EmptyField {
        /// Schema section (`root` or `http`).
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
    },
    /// A numeric field is out of bounds.
    OutOfRange {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
        /// Value provided.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },
    /// A URL field does not parse or uses an unsupported scheme.
    InvalidUrl {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
        /// Credential-free rendering of the value.
        value: String,
        /// Parser or scheme complaint.
        reason: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyField { field, .. } if *field == "label" => {
                ErrorCode::new("config", "invalid_label")
            },
            Self::EmptyField { .. } => ErrorCode::new("config", "invalid_empty"),
            Self::OutOfRange { .. } => ErrorCode::new("config", "invalid_range"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_url"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField { section, field } => {
                write!(formatter, "{section}.{field} must be non-empty")
            },
            Self::OutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => write!(
                formatter,
                "{section}.{field} must be between {min} and {max} (got {value})"
            ),
            Self::InvalidUrl {
                section,
                field,
                reason,
                ..
            } => write!(formatter, "{section}.{field} is not a valid URL: {reason}"),
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::EmptyField { section, field } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field),
            ConfigSchemaError::OutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value", value.to_string())
                .with_metadata("min", min.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::InvalidUrl {
                section,
                field,
                value,
                ..
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value", value),
        }
    }
}
