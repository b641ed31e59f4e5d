//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "lifeline-cli", "--"])
        .args(args)
        .env("LIFELINE_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help() {
    let (stdout, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("trigger"));
    assert!(stdout.contains("contacts"));
}

#[test]
fn test_trigger_false_alarm_settles_without_dispatch() {
    let (stdout, _, code) = run_cli(&[
        "trigger",
        "--severity",
        "3",
        "--false-alarm",
    ]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"type\":\"AlertTriggered\""));
    assert!(stdout.contains("\"type\":\"FalseAlarmConfirmed\""));
    assert!(!stdout.contains("\"type\":\"DispatchCompleted\""));
}

#[test]
fn test_trigger_confirm_produces_dispatch_result() {
    let (stdout, _, code) = run_cli(&[
        "trigger",
        "--severity",
        "8",
        "--confirm",
    ]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"type\":\"EmergencyConfirmed\""));
    assert!(stdout.contains("\"type\":\"DispatchCompleted\""));
    assert!(stdout.contains("\"success\": true"));
}

#[test]
fn test_trigger_rejects_bad_severity() {
    let (_, stderr, code) = run_cli(&["trigger", "--severity", "0", "--confirm"]);
    assert!(code != 0);
    assert!(stderr.contains("Severity"));
}

#[test]
fn test_log_recent_runs() {
    let (_, _, code) = run_cli(&["log", "recent", "--limit", "5"]);
    assert_eq!(code, 0);
}
