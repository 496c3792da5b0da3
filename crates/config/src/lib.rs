//! # reqlens-config
//!
//! Configuration schema, env overrides, and file loading for the diagnostics
//! facade and the instrumented HTTP client. This crate depends on `shared` only.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use env::{
    DiagnosticsEnv, ENV_ENABLED, ENV_HTTP_BASE_URL, ENV_HTTP_TIMEOUT_MS, ENV_LABEL,
    ENV_LOG_FORMAT, ENV_PREVIEW_CHARS, EnvParseError, apply_env_overrides,
};
pub use load::{
    ConfigFormat, load_config_from_path, load_config_from_sources, load_config_std_env,
    to_pretty_json,
};
pub use schema::{
    ConfigSchemaError, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_LABEL, DEFAULT_PREVIEW_CHARS,
    DiagnosticsConfig, HttpClientConfig, LogFormat, ValidatedDiagnosticsConfig,
    parse_diagnostics_config_json, parse_diagnostics_config_toml,
};
