#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CLUSTER_ID: &str = "id=c1,project_id=p1,organization_id=o1";

/// A command isolated from any config on the host
fn capella(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("capella").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("CAPELLA_CONFIG_PATH")
        .env_remove("CAPELLA_HOST")
        .env_remove("CAPELLA_AUTH_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    capella(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("wait"))
        .stdout(predicate::str::contains("id"));
}

#[test]
fn test_wait_help() {
    let home = tempfile::tempdir().unwrap();
    capella(&home)
        .args(["wait", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--for"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--interval"));
}

#[test]
fn test_invalid_command() {
    let home = tempfile::tempdir().unwrap();
    capella(&home).arg("invalid-command").assert().failure();
}

#[test]
fn test_id_encode() {
    let home = tempfile::tempdir().unwrap();
    capella(&home)
        .args([
            "id",
            "encode",
            "id=100",
            "cluster_id=200",
            "project_id=300",
            "organization_id=400",
        ])
        .assert()
        .success()
        .stdout("id=100,cluster_id=200,project_id=300,organization_id=400\n");
}

#[test]
fn test_id_encode_rejects_empty_value() {
    let home = tempfile::tempdir().unwrap();
    capella(&home)
        .args(["id", "encode", "id=100", "project_id="])
        .assert()
        .failure()
        .stderr(predicate::str::contains("project_id"));
}

#[test]
fn test_id_decode_by_kind() {
    let home = tempfile::tempdir().unwrap();
    capella(&home)
        .args([
            "id",
            "decode",
            "organization_id=o1,id=c1,project_id=p1",
            "--kind",
            "cluster",
        ])
        .assert()
        .success()
        .stdout("id=c1\nproject_id=p1\norganization_id=o1\n");
}

#[test]
fn test_id_decode_by_fields() {
    let home = tempfile::tempdir().unwrap();
    capella(&home)
        .args(["id", "decode", "id=b1,bucket_id=x", "--fields", "id,bucket_id"])
        .assert()
        .success()
        .stdout("id=b1\nbucket_id=x\n");
}

#[test]
fn test_id_decode_count_mismatch() {
    let home = tempfile::tempdir().unwrap();
    capella(&home)
        .args(["id", "decode", CLUSTER_ID, "--kind", "backup"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 4 ID fields, found 3"));
}

#[test]
fn test_id_decode_needs_expected_fields() {
    let home = tempfile::tempdir().unwrap();
    capella(&home)
        .args(["id", "decode", CLUSTER_ID])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--kind"));
}

#[test]
fn test_unknown_kind() {
    let home = tempfile::tempdir().unwrap();
    capella(&home)
        .args(["status", "bucket", CLUSTER_ID])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown resource kind: bucket"));
}

#[test]
fn test_status_without_config() {
    let home = tempfile::tempdir().unwrap();
    capella(&home)
        .args(["status", "cluster", CLUSTER_ID])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No control-plane host configured"));
}

#[test]
fn test_status_without_token() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(home.path().join("capella.yaml"), "host: http://127.0.0.1:1\n").unwrap();

    capella(&home)
        .args(["status", "cluster", CLUSTER_ID])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No auth token configured"));
}

#[test]
fn test_wait_rejects_interval_not_below_timeout() {
    let home = tempfile::tempdir().unwrap();
    capella(&home)
        .env("CAPELLA_HOST", "http://127.0.0.1:1")
        .env("CAPELLA_AUTH_TOKEN", "token")
        .args([
            "wait",
            "cluster",
            CLUSTER_ID,
            "--for",
            "absent",
            "--timeout",
            "5",
            "--interval",
            "5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("shorter than timeout"));
}

#[test]
fn test_wait_rejects_zero_interval() {
    let home = tempfile::tempdir().unwrap();
    capella(&home)
        .env("CAPELLA_HOST", "http://127.0.0.1:1")
        .env("CAPELLA_AUTH_TOKEN", "token")
        .args(["wait", "cluster", CLUSTER_ID, "--interval", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be non-zero"));
}
