//! Bytes command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, to_pretty_json_line};
use reqlens_facade::format_bytes;

/// Run the bytes command.
pub fn run_bytes(mode: OutputMode, bytes: u64) -> Result<CliOutput, CliError> {
    let formatted = format_bytes(bytes);
    let stdout = if mode.is_json() {
        to_pretty_json_line(&serde_json::json!({
            "bytes": bytes,
            "formatted": formatted,
        }))?
    } else {
        format!("{formatted}\n")
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
