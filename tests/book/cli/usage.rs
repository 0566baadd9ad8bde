//! CLI usage examples from the book
//!
//! ```bash
//! scopekit list
//! scopekit run procedure_suppresses --no-color
//! scopekit run --output json --report reports.json
//! scopekit verify --strict
//! ```

use std::process::Command;

fn scopekit() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_scopekit"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_list_example() {
    let output = scopekit().arg("list").output().expect("run scopekit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("handler_suppresses"));
    assert!(stdout.contains("procedure_reraises"));
}

#[test]
fn test_run_text_example() {
    let output = scopekit()
        .args(["run", "procedure_suppresses", "--no-color"])
        .output()
        .expect("run scopekit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("#### procedure_suppresses() stdout"));
    assert!(stdout.contains("Starting\nrun\nValueError occured.\nIgnore Exception\nExiting\n@end with block"));
}

#[test]
fn test_run_reports_escape() {
    let output = scopekit()
        .args(["run", "procedure_reraises", "--no-color"])
        .output()
        .expect("run scopekit");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("!! escaped: Exception: re-raise"));
}

#[test]
fn test_run_json_report_example() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports.json");

    let output = scopekit()
        .args(["run", "--output", "json", "--report"])
        .arg(&path)
        .output()
        .expect("run scopekit");
    assert!(output.status.success());

    let stdout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stdout, written);
    let reports = written.as_array().unwrap();
    assert_eq!(reports.len(), scopekit::scenarios::catalog().len());
    assert_eq!(reports[0]["name"], "handler_suppresses");
}

#[test]
fn test_verify_example() {
    let output = scopekit()
        .args(["verify", "--strict"])
        .output()
        .expect("run scopekit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PASS  procedure_unhandled"));
    assert!(stdout.contains("0 failed"));
}

#[test]
fn test_unknown_scenario_example() {
    let output = scopekit()
        .args(["run", "no_such_scenario"])
        .output()
        .expect("run scopekit");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown scenario"));
}

#[test]
fn test_config_file_example() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scopekit.json");
    std::fs::write(&path, r#"{"color": false}"#).unwrap();

    let output = scopekit()
        .arg("--config")
        .arg(&path)
        .args(["run", "handler_normal_exit"])
        .output()
        .expect("run scopekit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("#### handler_normal_exit() stdout"));
    assert!(!stdout.contains("\x1b[33m"));
    assert!(stdout.contains("__exit__(None, None, None)"));
}
