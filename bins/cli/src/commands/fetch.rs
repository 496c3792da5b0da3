//! Fetch command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, to_pretty_json_line};
use reqlens_facade::{
    HttpResponse, Instrumentation, ParseOutcome, RequestConfig, TimingSummary, ValidationVerdict,
    format_bytes,
};
use std::fmt::Write as _;

/// Timing key wrapping the whole exchange.
pub const FETCH_TIMER: &str = "fetch";

/// Inputs for the fetch command.
#[derive(Debug)]
pub struct FetchInput<'a> {
    pub url: &'a str,
    pub method: &'a str,
    pub body: Option<&'a str>,
    pub headers: &'a [String],
    pub require: &'a [String],
}

/// Run one instrumented request and report status, timings and the optional verdict.
pub fn run_fetch(
    instrumentation: &Instrumentation,
    mode: OutputMode,
    input: &FetchInput<'_>,
) -> Result<CliOutput, CliError> {
    let request = build_request(instrumentation, input)?;
    let diagnostics = instrumentation.diagnostics();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    diagnostics.start_timing(FETCH_TIMER);
    let outcome = runtime.block_on(instrumentation.client().send(request));
    diagnostics.end_timing(FETCH_TIMER);
    let response = outcome?;

    let verdict = (!input.require.is_empty())
        .then(|| diagnostics.validate_response(Some(&response), input.require));
    let exit_code = if verdict.as_ref().is_some_and(|verdict| !verdict.valid()) {
        ExitCode::InvalidInput
    } else {
        ExitCode::Ok
    };

    let size = format_bytes(diagnostics.estimate_size(&response.data));
    let timings = diagnostics.timing_summary();
    let stdout = if mode.is_json() {
        to_pretty_json_line(&serde_json::json!({
            "status": response.status,
            "statusText": response.status_text,
            "size": size,
            "dataKeys": response.data_keys(),
            "timings": timings,
            "validation": verdict,
        }))?
    } else {
        format_fetch_text(&response, &size, &timings, verdict.as_ref())
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code,
    })
}

fn build_request(
    instrumentation: &Instrumentation,
    input: &FetchInput<'_>,
) -> Result<RequestConfig, CliError> {
    let mut request = RequestConfig::new(input.method, input.url);
    for header in input.headers {
        let (name, value) = parse_header(header)?;
        request = request.with_header(name, value);
    }
    if let Some(body) = input.body {
        match instrumentation.diagnostics().log_json_parsing(body) {
            ParseOutcome::Success(value) => request = request.with_body(value),
            ParseOutcome::Failure(failure) => {
                return Err(CliError::InvalidInput(format!(
                    "--body is not valid JSON: {}",
                    failure.message
                )));
            },
        }
    }
    Ok(request)
}

fn parse_header(raw: &str) -> Result<(&str, &str), CliError> {
    raw.split_once(':')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| CliError::InvalidInput(format!("header must be `name: value`, got `{raw}`")))
}

fn format_fetch_text(
    response: &HttpResponse,
    size: &str,
    timings: &TimingSummary,
    verdict: Option<&ValidationVerdict>,
) -> String {
    let mut out = format!("status: {} {}\nsize: {size}\n", response.status, response.status_text);
    let keys = response.data_keys();
    if !keys.is_empty() {
        let _ = writeln!(out, "keys: {}", keys.join(", "));
    }
    out.push_str("timings:\n");
    for (operation, duration) in timings.iter() {
        let _ = writeln!(out, "  {operation}: {duration}");
    }
    if let Some(verdict) = verdict {
        let _ = writeln!(out, "valid: {}", verdict.valid());
        for error in verdict.errors() {
            let _ = writeln!(out, "  error: {error}");
        }
        for warning in verdict.warnings() {
            let _ = writeln!(out, "  warning: {warning}");
        }
    }
    out
}
