//! Integration tests for `simplity validate-value`.
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

/// Path to a shared fixture file.
fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../tests/fixtures");
    path.push(name);
    path.to_str().expect("utf-8 path").to_owned()
}

/// Runs `simplity validate-value` against `schemas.json` with a pinned clock.
fn validate(schema: &str, value: &str, extra: &[&str]) -> Output {
    Command::new(simplity_bin())
        .args(["validate-value", "--today", "2026-03-15", "--no-color"])
        .args(["--schemas", &fixture("schemas.json"), "--schema", schema])
        .args(extra)
        .arg(value)
        .env_remove("SIMPLITY_LOG")
        .output()
        .expect("run simplity validate-value")
}

fn stdout_json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// exit 0
// ---------------------------------------------------------------------------

#[test]
fn valid_integer_exits_0_with_parsed_value() {
    let out = validate("qty", "7", &[]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(stdout_json(&out), serde_json::json!({"value": 7}));
}

#[test]
fn decimal_is_rounded() {
    let out = validate("price", "12.3456", &[]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout_json(&out)["value"], 12.35);
}

#[test]
fn boolean_text_is_normalized() {
    let out = validate("active", "1", &[]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout_json(&out)["value"], true);
}

#[test]
fn built_in_schema_works_without_a_catalog() {
    let out = Command::new(simplity_bin())
        .args(["validate-value", "--schema", "_name", "Ada Lovelace"])
        .output()
        .expect("run simplity validate-value");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout_json(&out)["value"], "Ada Lovelace");
}

// ---------------------------------------------------------------------------
// exit 1
// ---------------------------------------------------------------------------

#[test]
fn out_of_range_integer_exits_1() {
    let out = validate("qty", "11", &[]);
    assert_eq!(out.status.code(), Some(1));
    let json = stdout_json(&out);
    assert!(json["value"].is_null(), "value: {}", json["value"]);
    assert_eq!(json["messages"][0]["messageId"], "_maxValue");
    assert_eq!(json["messages"][0]["params"], serde_json::json!(["10"]));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("value may be at most 10"),
        "stderr: {stderr}"
    );
}

#[test]
fn message_name_replaces_the_failure_id() {
    let out = validate(
        "zip",
        "12a456",
        &["--messages", &fixture("messages.json")],
    );
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout_json(&out)["messages"][0]["messageId"], "invalidZip");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("a zip code has exactly six digits"),
        "stderr: {stderr}"
    );
}

#[test]
fn date_beyond_the_window_names_the_latest_date() {
    let out = validate("dueDate", "2026-05-01", &[]);
    assert_eq!(out.status.code(), Some(1));
    let json = stdout_json(&out);
    assert_eq!(json["messages"][0]["messageId"], "_latestDate");
    assert_eq!(json["messages"][0]["params"], serde_json::json!(["2026-04-14"]));
}

#[test]
fn unparseable_number_gives_null_sentinel() {
    let out = validate("qty", "seven", &[]);
    assert_eq!(out.status.code(), Some(1));
    let json = stdout_json(&out);
    assert!(json["value"].is_null(), "value: {}", json["value"]);
    assert_eq!(json["messages"][0]["messageId"], "_invalidNumber");
}

#[test]
fn unknown_schema_exits_1_with_missing_schema() {
    let out = validate("nope", "x", &[]);
    assert_eq!(out.status.code(), Some(1));
    let json = stdout_json(&out);
    assert_eq!(json["messages"][0]["messageId"], "_missingSchema");
    assert_eq!(json["messages"][0]["params"], serde_json::json!(["nope"]));
}

#[test]
fn json_mode_prints_the_result_on_one_line() {
    let out = validate("qty", "0", &["--format", "json"]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().count(), 1, "stdout: {stdout}");
    assert_eq!(stdout_json(&out)["messages"][0]["messageId"], "_minValue");
}

// ---------------------------------------------------------------------------
// exit 2
// ---------------------------------------------------------------------------

#[test]
fn missing_catalog_exits_2() {
    let out = Command::new(simplity_bin())
        .args([
            "validate-value",
            "--schemas",
            "/no/such/schemas.json",
            "--schema",
            "qty",
            "1",
        ])
        .output()
        .expect("run simplity validate-value");
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("file not found"), "stderr: {stderr}");
}

#[test]
fn catalog_with_bad_regex_exits_2() {
    let out = Command::new(simplity_bin())
        .args([
            "validate-value",
            "--schemas",
            &fixture("bad_schemas.json"),
            "--schema",
            "code",
            "abc",
        ])
        .output()
        .expect("run simplity validate-value");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("code"), "stderr: {stderr}");
}
