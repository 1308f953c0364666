//! End-to-end CLI tests against a temporary data directory

use assert_cmd::Command;
use predicates::prelude::*;

fn kindred(data_dir: &str) -> Command {
    let mut cmd = Command::cargo_bin("kindred").unwrap();
    cmd.args(["--data-dir", data_dir]);
    cmd
}

#[test]
fn shows_help() {
    Command::cargo_bin("kindred")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Genealogy graph engine"));
}

#[test]
fn create_attach_and_classify() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().to_str().unwrap();

    // Create a user and tree, capturing ids as JSON
    let output = kindred(data)
        .args([
            "--format", "json", "tree", "create", "--username", "ada", "--first", "Ada",
            "--last", "Lovelace",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let created: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tree_id = created["treeId"].as_str().unwrap().to_string();
    let root_id = created["rootNodeId"].as_str().unwrap().to_string();

    // Attach a child under the root
    let output = kindred(data)
        .args([
            "--format", "json", "attach", "child", "--tree", &tree_id, "--parent", &root_id,
            "--first", "Byron", "--last", "Lovelace",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let child_id = outcome["child"]["id"].as_str().unwrap().to_string();

    // Classify both directions
    kindred(data)
        .args(["relationship", &child_id, &root_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("parent"));

    kindred(data)
        .args(["relationship", &root_id, &child_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("child"));
}

#[test]
fn rejects_malformed_ids() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().to_str().unwrap();

    kindred(data)
        .args(["relationship", "not-a-ulid", "also-not"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid node id"));
}
