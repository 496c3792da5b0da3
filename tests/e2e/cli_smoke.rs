//! CLI E2E smoke tests for the offline commands.

use std::io::{self, Write};
use std::process::{Command, Output, Stdio};

fn reqlens(args: &[&str], stdin: &str, env: &[(&str, &str)]) -> io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_reqlens"));
    command
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in env {
        command.env(key, value);
    }
    let mut child = command.spawn()?;
    if let Some(mut pipe) = child.stdin.take() {
        pipe.write_all(stdin.as_bytes())?;
    }
    child.wait_with_output()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn bytes_prints_human_size() -> io::Result<()> {
    let output = reqlens(&["bytes", "1048576"], "", &[])?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "1 MB\n");
    Ok(())
}

#[test]
fn bytes_output_is_deterministic() -> io::Result<()> {
    let first = reqlens(&["bytes", "1536", "--output", "json"], "", &[])?;
    let second = reqlens(&["bytes", "1536", "--output", "json"], "", &[])?;
    assert_eq!(stdout(&first), stdout(&second));
    assert!(stdout(&first).contains("\"formatted\": \"1.5 KB\""));
    Ok(())
}

#[test]
fn parse_echoes_json_and_logs_success() -> io::Result<()> {
    let output = reqlens(&["parse"], r#"{"a":1}"#, &[("REQLENS_LABEL", "Smoke")])?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "{\n  \"a\": 1\n}\n");

    let logs = stderr(&output);
    assert!(logs.contains("⏱️ [Smoke] Started: JSON_PARSE"));
    assert!(logs.contains("✅ [Smoke] JSON parsing successful"));
    assert!(logs.contains("\"size\":\"7 Bytes\""));
    Ok(())
}

#[test]
fn parse_failure_exits_with_invalid_input() -> io::Result<()> {
    let output = reqlens(&["parse"], "{not json", &[])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).starts_with("parse failed: "));
    assert!(stderr(&output).contains("💥 [App] ERROR OCCURRED"));
    Ok(())
}

#[test]
fn validate_reports_missing_fields() -> io::Result<()> {
    let output = reqlens(
        &["validate", "--require", "title,modules", "--output", "json"],
        r#"{"status":200,"data":{"title":"Rust"}}"#,
        &[],
    )?;
    assert_eq!(output.status.code(), Some(2));
    let stdout = stdout(&output);
    assert!(stdout.contains("\"valid\": false"));
    assert!(stdout.contains("Missing required field: modules"));
    assert!(stderr(&output).contains("❌ [App] Response validation failed"));
    Ok(())
}

#[test]
fn validate_empty_stdin_is_a_missing_response() -> io::Result<()> {
    let output = reqlens(&["validate"], "", &[])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("error: Response is null or undefined"));
    Ok(())
}

#[test]
fn validate_passes_with_warnings() -> io::Result<()> {
    let output = reqlens(
        &["validate", "--require", "title,summary"],
        r#"{"data":{"title":"Rust","summary":null}}"#,
        &[],
    )?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        "valid: true\nwarning: Field summary is null or undefined\n"
    );
    Ok(())
}

#[test]
fn quiet_flag_silences_diagnostics() -> io::Result<()> {
    let output = reqlens(&["parse", "--quiet"], "[1,2]", &[])?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).is_empty());
    Ok(())
}

#[test]
fn disabled_env_silences_diagnostics() -> io::Result<()> {
    let output = reqlens(&["parse"], "true", &[("REQLENS_ENABLED", "false")])?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).is_empty());
    Ok(())
}

#[test]
fn json_log_format_writes_json_lines() -> io::Result<()> {
    let output = reqlens(&["parse"], "{}", &[("REQLENS_LOG_FORMAT", "json")])?;
    assert_eq!(output.status.code(), Some(0));
    let logs = stderr(&output);
    assert!(!logs.is_empty());
    assert!(logs.lines().all(|line| line.starts_with("{\"timestampMs\":")));
    Ok(())
}

#[test]
fn config_show_applies_env_overrides() -> io::Result<()> {
    let output = reqlens(
        &["config", "show"],
        "",
        &[("REQLENS_LABEL", "Checkout"), ("REQLENS_PREVIEW_CHARS", "40")],
    )?;
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout(&output);
    assert!(stdout.contains("\"label\": \"Checkout\""));
    assert!(stdout.contains("\"previewChars\": 40"));
    Ok(())
}

#[test]
fn invalid_env_override_exits_with_invalid_input() -> io::Result<()> {
    let output = reqlens(&["config", "show"], "", &[("REQLENS_ENABLED", "maybe")])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("error: config:"));
    Ok(())
}

#[test]
fn missing_config_file_is_reported() -> io::Result<()> {
    let output = reqlens(
        &["config", "show", "--config", "/nonexistent/reqlens.toml"],
        "",
        &[],
    )?;
    assert_ne!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("error: config:"));
    Ok(())
}
