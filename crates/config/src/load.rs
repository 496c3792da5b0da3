//! Config loading helpers (env + file).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::{DiagnosticsConfig, DiagnosticsEnv, ValidatedDiagnosticsConfig, apply_env_overrides};
use reqlens_shared::{ErrorClass, ErrorCode, ErrorEnvelope, ResultExt};
use std::path::Path;

/// Serialization format of a config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON document.
    Json,
    /// TOML document.
    Toml,
}

/// Load the config from in-memory sources using a deterministic precedence order.
///
/// Precedence (highest wins):
/// - env overrides (`DiagnosticsEnv`)
/// - config document
/// - defaults (`DiagnosticsConfig::default()`)
pub fn load_config_from_sources(
    config_text: Option<(&str, ConfigFormat)>,
    env: &DiagnosticsEnv,
) -> Result<ValidatedDiagnosticsConfig, ErrorEnvelope> {
    let config = match config_text {
        None => DiagnosticsConfig::default(),
        Some((input, format)) => parse_config_unvalidated(input, format)?,
    };

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

/// Load the config from an optional file path.
pub fn load_config_from_path(
    config_path: Option<&Path>,
    env: &DiagnosticsEnv,
) -> Result<ValidatedDiagnosticsConfig, ErrorEnvelope> {
    let config = match config_path {
        None => DiagnosticsConfig::default(),
        Some(path) => {
            let display = path.to_string_lossy();
            let format = detect_config_format(path)?;
            let config_text = read_config_file(path).with_metadata("path", display.clone())?;
            parse_config_unvalidated(&config_text, format).with_metadata("path", display)?
        },
    };

    apply_env_overrides(config, env)
}

/// Load the config from std env and an optional file path.
pub fn load_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedDiagnosticsConfig, ErrorEnvelope> {
    let env = DiagnosticsEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_config_from_path(config_path, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &DiagnosticsConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<DiagnosticsConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogFormat;
    use std::error::Error;

    #[test]
    fn env_wins_over_document() -> Result<(), Box<dyn Error>> {
        let env = DiagnosticsEnv {
            label: Some("FromEnv".into()),
            ..DiagnosticsEnv::default()
        };
        let config = load_config_from_sources(
            Some((r#"{ "label": "FromFile", "logFormat": "json" }"#, ConfigFormat::Json)),
            &env,
        )?;
        assert_eq!(config.label.as_ref(), "FromEnv");
        assert_eq!(config.log_format, LogFormat::Json);
        Ok(())
    }

    #[test]
    fn invalid_document_value_overridden_by_valid_env_succeeds() -> Result<(), Box<dyn Error>> {
        let env = DiagnosticsEnv {
            preview_chars: Some(64),
            ..DiagnosticsEnv::default()
        };
        let config =
            load_config_from_sources(Some(("previewChars = 0\n", ConfigFormat::Toml)), &env)?;
        assert_eq!(config.preview_chars, 64);
        Ok(())
    }

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("/definitely/not/here/reqlens.toml");
        let error = load_config_from_path(Some(path), &DiagnosticsEnv::default()).err();
        let error = error.as_ref();
        assert_eq!(
            error.map(|envelope| envelope.code.clone()),
            Some(ErrorCode::new("config", "config_file_not_found"))
        );
        assert_eq!(
            error.and_then(|envelope| envelope.metadata.get("path").cloned()),
            Some(path.to_string_lossy().to_string())
        );
    }

    #[test]
    fn malformed_file_reports_path() -> Result<(), Box<dyn Error>> {
        let path = std::env::temp_dir()
            .join(format!("reqlens-malformed-{}.json", std::process::id()));
        std::fs::write(&path, "{ \"label\": ")?;
        let error = load_config_from_path(Some(&path), &DiagnosticsEnv::default()).err();
        std::fs::remove_file(&path)?;

        let error = error.ok_or_else(|| std::io::Error::other("malformed config was accepted"))?;
        assert_eq!(error.code, ErrorCode::new("config", "invalid_json"));
        assert_eq!(
            error.metadata.get("path").cloned(),
            Some(path.to_string_lossy().to_string())
        );
        assert_eq!(error.metadata.get("source").map(String::as_str), Some("config"));
        Ok(())
    }

    #[test]
    fn unsupported_extension_is_rejected_before_reading() {
        let error = load_config_from_path(
            Some(Path::new("/tmp/reqlens.yaml")),
            &DiagnosticsEnv::default(),
        )
        .err();
        assert_eq!(
            error.map(|envelope| envelope.code),
            Some(ErrorCode::new("config", "invalid_format"))
        );
    }

    #[test]
    fn serialization_is_deterministic() -> Result<(), Box<dyn Error>> {
        let config = load_config_from_sources(None, &DiagnosticsEnv::default())?;
        let first = to_pretty_json(&config)?;
        let second = to_pretty_json(&config)?;
        assert_eq!(first, second);
        assert!(first.contains("\"logFormat\": \"pretty\""));
        Ok(())
    }
}
