//! Validate command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, to_pretty_json_line};
use reqlens_facade::{Diagnostics, ValidationVerdict};
use serde_json::Value;
use std::fmt::Write as _;

/// Validate a `{status, statusText, data}` document read from stdin.
///
/// Empty input and `null` count as a missing response.
pub fn run_validate(
    diagnostics: &Diagnostics,
    mode: OutputMode,
    input: &str,
    require: &[String],
) -> Result<CliOutput, CliError> {
    let response = if input.trim().is_empty() {
        None
    } else {
        let value: Value = serde_json::from_str(input)
            .map_err(|error| CliError::InvalidInput(format!("stdin is not valid JSON: {error}")))?;
        Some(value).filter(|value| !value.is_null())
    };

    let verdict = diagnostics.validate_response(response.as_ref(), require);
    let exit_code = if verdict.valid() {
        ExitCode::Ok
    } else {
        ExitCode::InvalidInput
    };
    let stdout = if mode.is_json() {
        to_pretty_json_line(&verdict)?
    } else {
        format_verdict_text(&verdict)
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code,
    })
}

fn format_verdict_text(verdict: &ValidationVerdict) -> String {
    let mut out = format!("valid: {}\n", verdict.valid());
    for error in verdict.errors() {
        let _ = writeln!(out, "error: {error}");
    }
    for warning in verdict.warnings() {
        let _ = writeln!(out, "warning: {warning}");
    }
    out
}
