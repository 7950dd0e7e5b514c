//! Binary side-exits and argument validation

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("u360-ingest").unwrap()
}

#[test]
fn test_hash_prints_value_and_exits() {
    cmd()
        .arg("--hash")
        .arg("hello")
        .assert()
        .success()
        .stdout(predicate::eq("Hash value is 3848350155.\n"));
}

#[test]
fn test_hash_of_postal_code() {
    cmd()
        .args(["--hash", "00000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3463585499"));
}

#[test]
fn test_gen_prints_ndjson_users() {
    let output = cmd().args(["--gen", "3"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value["user_id"].is_string());
        assert!(value.get("row_num").is_none());
    }
}

#[test]
fn test_gen_defaults_to_ten_records() {
    let output = cmd().arg("--gen").output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap().lines().count(), 10);
}

#[test]
fn test_bucket_and_prefix_required() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("<BUCKET>"));
}

#[test]
fn test_invalid_worker_count_is_rejected() {
    cmd()
        .args(["--load-workers", "0", "users", "2024/"])
        .env("LOG_OUTPUT", "console")
        .assert()
        .failure()
        .stderr(predicate::str::contains("load workers must be greater than zero"));
}

#[test]
fn test_help_lists_flags() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--buf-size"))
        .stdout(predicate::str::contains("--hosts"))
        .stdout(predicate::str::contains("--gen"));
}
