//! Config command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use reqlens_facade::load_effective_config_json;
use std::collections::BTreeMap;
use std::path::Path;

/// Print the effective config (defaults, then file, then env) as JSON.
pub fn run_config_show(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> Result<CliOutput, CliError> {
    let stdout = load_effective_config_json(env, config_path)?;
    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
