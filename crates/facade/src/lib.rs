//! # reqlens-facade
//!
//! Facade API for consumers (CLI and embedding applications).
//! This crate wires `config` into `adapters` and `app`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use reqlens_adapters::{
    ConsoleLogger, InstrumentedClientConfig, JsonLogger, SystemClock,
};
use reqlens_config::{DiagnosticsEnv, load_config_from_path, to_pretty_json};
use reqlens_ports::LoggerPort;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

pub use reqlens_adapters::{InstrumentedClient, LogSink, MemoryLogSink, StderrLogSink};
pub use reqlens_app::{
    Diagnostics, DiagnosticsDeps, DiagnosticsOptions, ErrorDetails, Interceptor, JsonInput,
    ParseFailure, ParseOutcome,
};
pub use reqlens_config::{DiagnosticsConfig, LogFormat, ValidatedDiagnosticsConfig};
pub use reqlens_domain::{
    ResponsePayload, TimingEntry, TimingSummary, ValidationVerdict, format_bytes,
};
pub use reqlens_ports::{ExchangeHooks, HttpError, HttpResponse, RequestConfig, tags};
pub use reqlens_shared::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, Result};

/// Tracing target for facade wiring.
pub const TRACING_TARGET: &str = "reqlens_facade";

/// Diagnostics facade plus an HTTP client with its interceptor installed.
#[derive(Clone)]
pub struct Instrumentation {
    config: ValidatedDiagnosticsConfig,
    diagnostics: Diagnostics,
    client: InstrumentedClient,
}

impl Instrumentation {
    /// Wire everything from a validated config, writing log lines to `sink`.
    pub fn from_config(config: ValidatedDiagnosticsConfig, sink: Arc<dyn LogSink>) -> Result<Self> {
        let diagnostics = build_diagnostics(&config, sink);
        let client = build_client(&config, &diagnostics)?;
        tracing::debug!(
            target: TRACING_TARGET,
            label = %config.label,
            log_format = config.log_format.as_str(),
            enabled = config.enabled,
            base_url = config.base_url().map(|url| url.as_str()),
            "instrumentation wired"
        );
        Ok(Self {
            config,
            diagnostics,
            client,
        })
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &ValidatedDiagnosticsConfig {
        &self.config
    }

    /// Diagnostics facade.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Instrumented HTTP client.
    #[must_use]
    pub const fn client(&self) -> &InstrumentedClient {
        &self.client
    }
}

/// Logger for the configured output format.
#[must_use]
pub fn build_logger(format: LogFormat, sink: Arc<dyn LogSink>) -> Arc<dyn LoggerPort> {
    match format {
        LogFormat::Pretty => Arc::new(ConsoleLogger::new(sink)),
        LogFormat::Json => Arc::new(JsonLogger::new(sink)),
    }
}

/// Diagnostics facade configured from `config`, backed by the system clock.
#[must_use]
pub fn build_diagnostics(config: &DiagnosticsConfig, sink: Arc<dyn LogSink>) -> Diagnostics {
    Diagnostics::new(
        DiagnosticsOptions {
            label: config.label.clone(),
            enabled: config.enabled,
            preview_chars: usize::try_from(config.preview_chars).unwrap_or(usize::MAX),
        },
        DiagnosticsDeps {
            logger: build_logger(config.log_format, sink),
            clock: Arc::new(SystemClock),
        },
    )
}

/// HTTP client with an interceptor of `diagnostics` installed.
pub fn build_client(
    config: &ValidatedDiagnosticsConfig,
    diagnostics: &Diagnostics,
) -> Result<InstrumentedClient> {
    let client_config = InstrumentedClientConfig::from_http_config(&config.http, config.base_url());
    InstrumentedClient::new(&client_config, Arc::new(diagnostics.create_interceptor()))
}

/// Load the effective config from env overrides and an optional file.
pub fn load_effective_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> Result<ValidatedDiagnosticsConfig> {
    let env = DiagnosticsEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    load_config_from_path(config_path, &env)
}

/// Load the effective config and render it as deterministic pretty JSON.
pub fn load_effective_config_json(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> Result<String> {
    let config = load_effective_config(env, config_path)?;
    to_pretty_json(config.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqlens_config::{ENV_ENABLED, ENV_LABEL, ENV_LOG_FORMAT};

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn env_overrides_reach_the_diagnostics_facade() -> Result<()> {
        let config = load_effective_config(
            &env(&[(ENV_LABEL, "Checkout"), (ENV_ENABLED, "false")]),
            None,
        )?;
        let sink = Arc::new(MemoryLogSink::default());
        let instrumentation = Instrumentation::from_config(config, sink.clone())?;

        assert_eq!(instrumentation.diagnostics().label(), "Checkout");
        assert!(!instrumentation.diagnostics().is_enabled());
        instrumentation.diagnostics().start_timing("noop");
        assert!(sink.take().is_empty());
        Ok(())
    }

    #[test]
    fn pretty_format_writes_console_lines() -> Result<()> {
        let config = load_effective_config(&env(&[(ENV_LABEL, "Cli")]), None)?;
        let sink = Arc::new(MemoryLogSink::default());
        let diagnostics = build_diagnostics(&config, sink.clone());
        diagnostics.start_timing("load");

        let lines = sink.take();
        assert_eq!(lines.len(), 1);
        assert!(lines.iter().all(|line| line.ends_with("] ⏱️ [Cli] Started: load\n")));
        Ok(())
    }

    #[test]
    fn json_format_writes_json_lines() -> Result<()> {
        let config = load_effective_config(&env(&[(ENV_LOG_FORMAT, "json")]), None)?;
        let sink = Arc::new(MemoryLogSink::default());
        let diagnostics = build_diagnostics(&config, sink.clone());
        diagnostics.log(tags::STATE, "hello", None);

        let lines = sink.take();
        assert_eq!(lines.len(), 1);
        assert!(lines.iter().all(|line| line.starts_with("{\"timestampMs\":")));
        assert!(lines.iter().all(|line| line.contains("\"label\":\"App\"")));
        Ok(())
    }

    #[test]
    fn invalid_env_values_are_rejected() {
        let error = load_effective_config(&env(&[(ENV_ENABLED, "maybe")]), None);
        assert!(matches!(error, Err(error) if error.code.namespace() == "config"));
    }

    #[test]
    fn effective_config_renders_as_json() -> Result<()> {
        let json = load_effective_config_json(&env(&[]), None)?;
        assert!(json.contains("\"label\": \"App\""));
        assert!(json.ends_with('\n'));
        Ok(())
    }
}
