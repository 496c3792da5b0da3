//! Parse command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, to_pretty_json_line};
use reqlens_facade::{Diagnostics, ParseOutcome};

/// Parse stdin as JSON through the diagnostics facade and echo the result.
pub fn run_parse(
    diagnostics: &Diagnostics,
    mode: OutputMode,
    input: String,
) -> Result<CliOutput, CliError> {
    match diagnostics.log_json_parsing(input) {
        ParseOutcome::Success(value) => Ok(CliOutput {
            stdout: to_pretty_json_line(&value)?,
            stderr: String::new(),
            exit_code: ExitCode::Ok,
        }),
        ParseOutcome::Failure(failure) => {
            let stdout = if mode.is_json() {
                to_pretty_json_line(&serde_json::json!({
                    "status": "error",
                    "error": failure,
                }))?
            } else {
                format!(
                    "parse failed: {} (line {}, column {})\n",
                    failure.message, failure.line, failure.column
                )
            };
            Ok(CliOutput {
                stdout,
                stderr: String::new(),
                exit_code: ExitCode::InvalidInput,
            })
        },
    }
}
