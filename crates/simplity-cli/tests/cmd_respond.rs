//! Integration tests for `simplity respond`, `simplity statuses` and
//! `simplity messages`.
#![allow(clippy::expect_used)]

use std::path::PathBuf;
use std::process::{Command, Output};

/// Path to the compiled `simplity` binary.
fn simplity_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("simplity");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(simplity_bin())
        .args(args)
        .arg("--no-color")
        .env_remove("SIMPLITY_LOG")
        .output()
        .expect("run simplity")
}

fn stdout_json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// respond
// ---------------------------------------------------------------------------

#[test]
fn completed_envelope_with_data_and_session() {
    let out = run(&[
        "respond",
        "--status",
        "completed",
        "--data",
        r#"{"orderId": 42}"#,
        "--session-id",
        "s-77",
    ]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(
        stdout_json(&out),
        serde_json::json!({
            "status": "completed",
            "description": "Completed with success",
            "data": {"orderId": 42},
            "sessionId": "s-77"
        })
    );
}

#[test]
fn failure_envelope_carries_the_rendered_message() {
    let out = run(&[
        "respond",
        "--status",
        "noSuchService",
        "--message-id",
        "_invalidValue",
        "--field",
        "serviceName",
        "--param",
        "orders.list",
    ]);
    assert_eq!(out.status.code(), Some(0));
    let json = stdout_json(&out);
    assert_eq!(json["status"], "noSuchService");
    let msg = &json["messages"][0];
    assert_eq!(msg["type"], "error");
    assert_eq!(msg["id"], "_invalidValue");
    assert_eq!(msg["text"], "This value is not valid");
    assert_eq!(msg["fieldName"], "serviceName");
    assert_eq!(msg["params"], serde_json::json!(["orders.list"]));
}

#[test]
fn failure_without_a_message_exits_1() {
    let out = run(&["respond", "--status", "serverError"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("serverError response requires at least one error message"),
        "stderr: {stderr}"
    );
}

#[test]
fn data_on_a_failure_exits_1() {
    let out = run(&[
        "respond",
        "--status",
        "noSuchSession",
        "--message-id",
        "_invalidValue",
        "--data",
        "{}",
    ]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn non_object_data_exits_2() {
    let out = run(&["respond", "--status", "completed", "--data", "42"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn unknown_status_is_a_usage_error() {
    let out = run(&["respond", "--status", "done"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unknown status"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// statuses / messages
// ---------------------------------------------------------------------------

#[test]
fn statuses_json_lists_all_ten() {
    let out = run(&["statuses", "--format", "json"]);
    assert_eq!(out.status.code(), Some(0));
    let json = stdout_json(&out);
    let rows = json.as_array().expect("array");
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[6]["status"], "serviceNameRequired");
    assert_eq!(rows[6]["description"], "No service name was specified");
}

#[test]
fn statuses_human_is_a_table() {
    let out = run(&["statuses"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().count(), 10);
    assert!(stdout.contains("noServer"), "stdout: {stdout}");
}

#[test]
fn messages_json_has_verbatim_templates() {
    let out = run(&["messages", "--format", "json"]);
    assert_eq!(out.status.code(), Some(0));
    let json = stdout_json(&out);
    assert_eq!(json["_minLength"], "should have at least ${1} characters");
    assert_eq!(json["_valueRequired"], "A value is required");
}
