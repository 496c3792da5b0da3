//! CLI E2E tests for `reqlens fetch` against a mock server.

use serde_json::{Value, json};
use std::error::Error;
use std::process::Output;
use tokio::process::Command;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn fetch(server: &MockServer, args: &[&str]) -> Result<Output, Box<dyn Error>> {
    let output = Command::new(env!("CARGO_BIN_EXE_reqlens"))
        .arg("fetch")
        .args(args)
        .env_remove("RUST_LOG")
        .env("REQLENS_LABEL", "CourseGenerator")
        .env("REQLENS_HTTP_BASE_URL", server.uri())
        .output()
        .await?;
    Ok(output)
}

async fn course_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/courses/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Rust",
            "summary": null,
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_prints_status_and_timings() -> Result<(), Box<dyn Error>> {
    let server = course_server().await;
    let output = fetch(&server, &["/courses/1", "--output", "json"]).await?;

    assert_eq!(output.status.code(), Some(0));
    let payload: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(payload["status"], json!(200));
    assert_eq!(payload["statusText"], json!("OK"));
    assert_eq!(payload["dataKeys"], json!(["title", "summary"]));
    assert_eq!(payload["validation"], Value::Null);
    let fetch_timing = payload["timings"]["fetch"]
        .as_str()
        .ok_or("missing fetch timing")?;
    assert!(fetch_timing.ends_with("ms"));

    let logs = String::from_utf8_lossy(&output.stderr);
    assert!(logs.contains("📡 [CourseGenerator] GET /courses/1"));
    assert!(logs.contains("📥 [CourseGenerator] Response from /courses/1"));
    assert!(logs.contains("✅ [CourseGenerator] Completed: fetch ("));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_validates_required_fields() -> Result<(), Box<dyn Error>> {
    let server = course_server().await;
    let output = fetch(&server, &["/courses/1", "--require", "title,summary,modules"]).await?;

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("status: 200 OK\n"));
    assert!(stdout.contains("valid: false\n"));
    assert!(stdout.contains("  error: Missing required field: modules\n"));
    assert!(stdout.contains("  warning: Field summary is null or undefined\n"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_sends_json_body() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/courses"))
        .and(body_json(json!({"title": "Rust"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .mount(&server)
        .await;

    let output = fetch(
        &server,
        &["/courses", "-X", "POST", "--body", r#"{"title":"Rust"}"#],
    )
    .await?;

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("status: 201 Created\n"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_rejects_invalid_body_before_sending() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    let output = fetch(&server, &["/courses", "-X", "POST", "--body", "{oops"]).await?;

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: invalid input: --body is not valid JSON"));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn upstream_failures_exit_with_code_four() -> Result<(), Box<dyn Error>> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let output = fetch(&server, &["/health"]).await?;

    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("❌ [CourseGenerator] Request failed after "));
    assert!(stderr.contains("error: upstream error (503): Request failed with status code 503"));
    Ok(())
}
