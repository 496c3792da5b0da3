//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present but empty or malformed
//! fails fast instead of silently falling back to the file or default value.

use crate::schema::{DiagnosticsConfig, LogFormat, ValidatedDiagnosticsConfig};
use reqlens_shared::{ErrorCode, ErrorEnvelope, redact_if_secret};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Env var: facade label.
pub const ENV_LABEL: &str = "REQLENS_LABEL";
/// Env var: runtime logging toggle.
pub const ENV_ENABLED: &str = "REQLENS_ENABLED";
/// Env var: log format (`pretty` or `json`).
pub const ENV_LOG_FORMAT: &str = "REQLENS_LOG_FORMAT";
/// Env var: parse-failure preview length.
pub const ENV_PREVIEW_CHARS: &str = "REQLENS_PREVIEW_CHARS";
/// Env var: HTTP base URL.
pub const ENV_HTTP_BASE_URL: &str = "REQLENS_HTTP_BASE_URL";
/// Env var: HTTP timeout in milliseconds.
pub const ENV_HTTP_TIMEOUT_MS: &str = "REQLENS_HTTP_TIMEOUT_MS";

const ALL_VARS: [&str; 6] = [
    ENV_LABEL,
    ENV_ENABLED,
    ENV_LOG_FORMAT,
    ENV_PREVIEW_CHARS,
    ENV_HTTP_BASE_URL,
    ENV_HTTP_TIMEOUT_MS,
];

/// Parsed env overrides. `None` means the variable was not set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticsEnv {
    /// Override for `label`.
    pub label: Option<Box<str>>,
    /// Override for `enabled`.
    pub enabled: Option<bool>,
    /// Override for `logFormat`.
    pub log_format: Option<LogFormat>,
    /// Override for `previewChars`.
    pub preview_chars: Option<u32>,
    /// Override for `http.baseUrl`.
    pub http_base_url: Option<Box<str>>,
    /// Override for `http.timeoutMs`.
    pub http_timeout_ms: Option<u64>,
}

impl DiagnosticsEnv {
    /// Parse overrides from an explicit variable map.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            label: parse_optional_trimmed_string(map, ENV_LABEL)?,
            enabled: parse_optional_bool(map, ENV_ENABLED)?,
            log_format: parse_optional_log_format(map, ENV_LOG_FORMAT)?,
            preview_chars: parse_optional_u32(map, ENV_PREVIEW_CHARS)?,
            http_base_url: parse_optional_url_string(map, ENV_HTTP_BASE_URL)?,
            http_timeout_ms: parse_optional_u64(map, ENV_HTTP_TIMEOUT_MS)?,
        })
    }

    /// Parse overrides from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ALL_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_string(), value);
            }
        }
        Self::from_map(&map)
    }

    /// True when no override is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: DiagnosticsConfig,
    env: &DiagnosticsEnv,
) -> Result<ValidatedDiagnosticsConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(label) = env.label.clone() {
        config.label = label;
    }
    if let Some(enabled) = env.enabled {
        config.enabled = enabled;
    }
    if let Some(format) = env.log_format {
        config.log_format = format;
    }
    if let Some(preview_chars) = env.preview_chars {
        config.preview_chars = preview_chars;
    }
    if let Some(base_url) = env.http_base_url.clone() {
        config.http.base_url = Some(base_url);
    }
    if let Some(timeout_ms) = env.http_timeout_ms {
        config.http.timeout_ms = timeout_ms;
    }

    config.validate_and_normalize().map_err(Into::into)
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Boolean env var had an invalid value.
    InvalidBool {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// URL env var had an invalid value.
    InvalidUrl {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "invalid_env_empty"),
            Self::InvalidBool { .. } => ErrorCode::new("config", "invalid_env_bool"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidUrl { .. } => ErrorCode::new("config", "invalid_env_url"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidBool { var, .. } => write!(formatter, "{var} must be a boolean"),
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
            Self::InvalidUrl { var, .. } => write!(formatter, "{var} must be a valid URL"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let envelope = Self::expected(code, error.to_string());

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidUrl { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", strip_credentials(&value)),
            EnvParseError::InvalidBool { var, value }
            | EnvParseError::InvalidInt { var, value }
            | EnvParseError::InvalidEnum { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", redact_if_secret(var, &value)),
        }
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some(trimmed.into()))
}

fn parse_optional_u32(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u32>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: raw.clone(),
        })
}

fn parse_optional_u64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: raw.clone(),
        })
}

fn parse_optional_bool(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<bool>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(EnvParseError::InvalidBool {
            var,
            value: raw.clone(),
        }),
    }
}

fn parse_optional_log_format(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<LogFormat>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    LogFormat::parse(raw)
        .map(Some)
        .ok_or_else(|| EnvParseError::InvalidEnum {
            var,
            value: raw.clone(),
        })
}

fn parse_optional_url_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(value) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };
    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Some(value)),
        _ => Err(EnvParseError::InvalidUrl {
            var,
            value: value.into_string(),
        }),
    }
}

fn strip_credentials(value: &str) -> String {
    match Url::parse(value) {
        Ok(mut url) if !url.username().is_empty() || url.password().is_some() => {
            let _ = url.set_username("");
            let _ = url.set_password(None);
            url.to_string()
        },
        Ok(url) => url.to_string(),
        Err(_) => value.to_string(),
    }
}
