//! CLI binary entrypoint.

mod commands;
mod error;
mod format;
mod telemetry;

use clap::{Parser, Subcommand};
use commands::{FetchInput, run_bytes, run_config_show, run_fetch, run_parse, run_validate};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode};
use reqlens_facade::{Instrumentation, StderrLogSink, load_effective_config};
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix of the env vars read as config overrides.
const ENV_PREFIX: &str = "REQLENS_";

#[derive(Debug, Parser)]
#[command(
    name = "reqlens",
    version,
    about = "Request/response instrumentation for human-facing debugging",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    /// Optional config file path (JSON/TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send one instrumented HTTP request.
    Fetch {
        /// Absolute URL, or a path joined with `http.baseUrl`.
        url: String,
        /// HTTP method.
        #[arg(long, short = 'X', default_value = "GET")]
        method: String,
        /// JSON request body.
        #[arg(long)]
        body: Option<String>,
        /// Extra header as `name: value` (repeatable).
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,
        /// Comma-separated fields the response payload must contain.
        #[arg(long, value_delimiter = ',')]
        require: Vec<String>,
    },
    /// Validate a `{status, statusText, data}` document read from stdin.
    Validate {
        /// Comma-separated fields the payload must contain.
        #[arg(long, value_delimiter = ',')]
        require: Vec<String>,
    },
    /// Parse stdin as JSON and echo it back.
    Parse,
    /// Format a byte count for humans.
    Bytes {
        /// Byte count.
        bytes: u64,
    },
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Print the effective config as JSON.
    Show,
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    telemetry::init_tracing();
    let mode = OutputMode::from_args(&cli.output);

    match run(&cli, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    tracing::debug!(exit_code = error.exit_code().as_u8(), "command failed");
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(cli: &Cli, mode: OutputMode) -> Result<CliOutput, CliError> {
    let env = std_env_overrides();
    let config_path = cli.config.as_deref();
    match &cli.command {
        Commands::Bytes { bytes } => run_bytes(mode, *bytes),
        Commands::Config {
            command: ConfigCommands::Show,
        } => run_config_show(&env, config_path),
        Commands::Fetch {
            url,
            method,
            body,
            headers,
            require,
        } => {
            let instrumentation = instrumentation(&env, config_path, mode)?;
            run_fetch(
                &instrumentation,
                mode,
                &FetchInput {
                    url,
                    method,
                    body: body.as_deref(),
                    headers,
                    require,
                },
            )
        },
        Commands::Validate { require } => {
            let instrumentation = instrumentation(&env, config_path, mode)?;
            let input = read_stdin()?;
            run_validate(instrumentation.diagnostics(), mode, &input, require)
        },
        Commands::Parse => {
            let instrumentation = instrumentation(&env, config_path, mode)?;
            let input = read_stdin()?;
            run_parse(instrumentation.diagnostics(), mode, input)
        },
    }
}

fn std_env_overrides() -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect()
}

fn instrumentation(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    mode: OutputMode,
) -> Result<Instrumentation, CliError> {
    let config = load_effective_config(env, config_path)?;
    let instrumentation = Instrumentation::from_config(config, Arc::new(StderrLogSink))?;
    if mode.quiet {
        instrumentation.diagnostics().set_enabled(false);
    }
    Ok(instrumentation)
}

fn read_stdin() -> Result<String, CliError> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    if !output.stderr.is_empty() {
        io::stderr().write_all(output.stderr.as_bytes())?;
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
