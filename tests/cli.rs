//! End-to-end smoke tests for the tasktree binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tasktree(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tasktree").unwrap();
    cmd.env("TASKTREE_HOME", home.path());
    cmd
}

#[test]
fn test_help() {
    Command::cargo_bin("tasktree")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hierarchical task list"));
}

#[test]
fn test_show_seeds_a_fresh_home() {
    let home = TempDir::new().unwrap();
    tasktree(&home)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Do now").and(predicate::str::contains("Trash")));
}

#[test]
fn test_add_and_show() {
    let home = TempDir::new().unwrap();
    tasktree(&home)
        .args(["add", "Buy milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task #15"));

    tasktree(&home)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Buy milk"));
}

#[test]
fn test_add_under_unknown_parent_is_a_no_op() {
    let home = TempDir::new().unwrap();
    tasktree(&home)
        .args(["add", "orphan", "--under", "999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing added"));
}

#[test]
fn test_export_import_round_trip() {
    let home = TempDir::new().unwrap();
    let backup = home.path().join("TaskTree_Backup.json");

    tasktree(&home)
        .args(["add", "keep me"])
        .assert()
        .success();
    tasktree(&home)
        .arg("export")
        .arg(&backup)
        .assert()
        .success();

    let fresh = TempDir::new().unwrap();
    tasktree(&fresh)
        .arg("import")
        .arg(&backup)
        .assert()
        .success();
    tasktree(&fresh)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("keep me"));
}

#[test]
fn test_import_rejects_invalid_file() {
    let home = TempDir::new().unwrap();
    let bad = home.path().join("bad.json");
    std::fs::write(&bad, b"{\"items\": 42}").unwrap();

    tasktree(&home)
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid app state"));
}

#[test]
fn test_sync_pushes_local_edits_to_the_remote_directory() {
    let home = TempDir::new().unwrap();
    let remote = TempDir::new().unwrap();

    tasktree(&home)
        .args(["add", "shared task"])
        .assert()
        .success();
    tasktree(&home)
        .args(["sync", "--user", "alice"])
        .arg("--remote")
        .arg(remote.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("pushed local state"));

    let blob = remote.path().join("alice").join("state.json");
    let contents = std::fs::read_to_string(blob).unwrap();
    assert!(contents.contains("shared task"));

    tasktree(&home)
        .args(["sync", "--user", "alice"])
        .arg("--remote")
        .arg(remote.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already in sync"));
}

#[test]
fn test_sync_without_remote_fails() {
    let home = TempDir::new().unwrap();
    tasktree(&home)
        .args(["sync", "--user", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no remote directory"));
}
