//! CLI integration tests
//!
//! Each test drives the compiled binary against a small ledger in a
//! temporary directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use porstore::crypto::tagged::{branch_hash, tagged_hash};
use porstore::storage::format::{BRANCH_TAG, LEAF_TAG};

fn write_ledger(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("users.txt");
    fs::write(&path, contents).unwrap();
    path
}

fn porstore() -> Command {
    Command::cargo_bin("porstore").unwrap()
}

#[test]
fn test_load_reports_count_and_root() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "2\n(1,1111)\n(2,2222)\n");

    let leaf1 = tagged_hash(LEAF_TAG, b"(1,1111)");
    let leaf2 = tagged_hash(LEAF_TAG, b"(2,2222)");
    let root = branch_hash(BRANCH_TAG, &leaf1, &leaf2);

    porstore()
        .arg("load")
        .arg(&ledger)
        .assert()
        .success()
        .stdout(predicate::str::contains("Records: 2"))
        .stdout(predicate::str::contains(root.to_hex()));
}

#[test]
fn test_load_missing_ledger_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.txt");

    porstore()
        .arg("load")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.txt"));
}

#[test]
fn test_query_prints_payload_and_proof() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "2\n(1,1111)\n(2,2222)\n");

    let leaf1 = tagged_hash(LEAF_TAG, b"(1,1111)");
    let leaf2 = tagged_hash(LEAF_TAG, b"(2,2222)");
    let root = branch_hash(BRANCH_TAG, &leaf1, &leaf2);
    let expected = format!(
        "(1,1111) (0x{} (right,0x{}) 0x{})\n",
        leaf1.to_hex(),
        leaf2.to_hex(),
        root.to_hex()
    );

    let output = porstore()
        .arg("query")
        .arg(&ledger)
        .arg("1")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), expected);
}

#[test]
fn test_query_unknown_id_succeeds_with_message() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "1\n(1,1111)\n");

    porstore()
        .arg("query")
        .arg(&ledger)
        .arg("42")
        .assert()
        .success()
        .stdout(predicate::str::contains("No record with id 42"));
}

#[test]
fn test_query_json_output() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "2\n(1,1111)\n(2,2222)\n");

    let output = porstore()
        .arg("query")
        .arg(&ledger)
        .arg("2")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["id"], 2);
    assert_eq!(value["payload"], "(2,2222)");

    let leaf1 = tagged_hash(LEAF_TAG, b"(1,1111)");
    let path = value["proof"]["path"].as_array().unwrap();
    assert_eq!(path.len(), 1);
    assert_eq!(path[0]["side"], "left");
    assert_eq!(path[0]["hash"], format!("0x{}", leaf1.to_hex()));
}

#[test]
fn test_query_json_unknown_id_is_null() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "1\n(1,1111)\n");

    let output = porstore()
        .arg("query")
        .arg(&ledger)
        .arg("9")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout, b"null\n");
}

#[test]
fn test_root_prints_hex() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "1\n(1,1111)\n");

    // single record: the root is the leaf hash itself
    let leaf = tagged_hash(LEAF_TAG, b"(1,1111)");

    let output = porstore().arg("root").arg(&ledger).output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        format!("{}\n", leaf.to_hex())
    );
}

#[test]
fn test_root_of_empty_store() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "0\n");

    porstore()
        .arg("root")
        .arg(&ledger)
        .assert()
        .success()
        .stdout(predicate::str::contains("empty"));
}

#[test]
fn test_build_logs_go_to_stderr_by_default() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "1\n(1,1111)\n");
    let leaf = tagged_hash(LEAF_TAG, b"(1,1111)");

    // first load rebuilds the caches; the info-level build log must land on
    // stderr, leaving stdout as the bare root hex
    let output = porstore()
        .arg("root")
        .arg(&ledger)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        format!("{}\n", leaf.to_hex())
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("building caches"));
}

#[test]
fn test_malformed_ledger_reports_line() {
    let dir = TempDir::new().unwrap();
    let ledger = write_ledger(&dir, "2\n(1,1111)\ngarbage\n");

    porstore()
        .arg("load")
        .arg(&ledger)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"));
}
