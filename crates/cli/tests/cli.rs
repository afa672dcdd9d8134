//! Command-line tests for the `msgproc` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const SUITE: &str = r#"
processes:
  echo:
    process:
      class: internal:echo
    message:
      request:
        value: 1
    result:
      value: 1
  route:
    process:
      class: internal:passThrough
      config:
        serviceList:
          ping: pong-service
    replies:
      1:
        reply:
          ok: true
    message:
      message: ping
    result:
      ok: true
  wrong:
    process:
      class: internal:echo
    message:
      request:
        value: 1
    result:
      value: 2
"#;

fn msgproc() -> Command {
    let mut cmd = Command::cargo_bin("msgproc").expect("binary is built");
    cmd.env("NO_COLOR", "1").env_remove("MSGPROC_LOG");
    cmd
}

#[test]
fn test_run_selected_cases_pass() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("suite.yaml");
    fs::write(&path, SUITE).unwrap();

    msgproc()
        .arg("run")
        .arg(&path)
        .args(["--test", "echo", "--test", "route"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS echo"))
        .stdout(predicate::str::contains("PASS route"))
        .stdout(predicate::str::contains("2 passed, 0 failed"));
}

#[test]
fn test_run_reports_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("suite.yaml");
    fs::write(&path, SUITE).unwrap();

    msgproc()
        .arg("run")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL wrong"))
        .stdout(predicate::str::contains("2 passed, 1 failed"));
}

#[test]
fn test_show_replies() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("suite.yaml");
    fs::write(&path, SUITE).unwrap();

    msgproc()
        .args(["run", "--show-replies", "-t", "route"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ok\": true"));
}

#[test]
fn test_list_cases() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("suite.yaml");
    fs::write(&path, format!("test: route\n{SUITE}")).unwrap();

    msgproc()
        .arg("list")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("internal:passThrough"))
        .stdout(predicate::str::is_match(r"\* route").unwrap());
}

#[test]
fn test_missing_file() {
    msgproc()
        .args(["run", "does-not-exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load"));
}
