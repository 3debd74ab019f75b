// CLI exit code tests for the backporter binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn backporter(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("backporter").unwrap();
    cmd.current_dir(workdir)
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("GITHUB_EVENT_PATH")
        .env_remove("RUST_LOG");
    cmd
}

fn write_event(dir: &Path, action: &str, merged: bool, full_name: &str) -> std::path::PathBuf {
    let path = dir.join("event.json");
    let payload = json!({
        "action": action,
        "number": 42,
        "pull_request": { "number": 42, "merged": merged },
        "repository": { "full_name": full_name }
    });
    std::fs::write(&path, payload.to_string()).unwrap();
    path
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    backporter(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("action"));
}

#[test]
fn test_invalid_repository_fails() {
    let dir = TempDir::new().unwrap();
    backporter(dir.path())
        .args(["run", "--token", "abc", "not-a-repository", "42"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid Repository Identifier"));
}

#[test]
fn test_missing_token_fails() {
    let dir = TempDir::new().unwrap();
    backporter(dir.path())
        .args(["run", "octo-org/octo-repo", "42"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GitHub Authentication Error"));
}

#[test]
fn test_action_ignores_unrelated_event() {
    let dir = TempDir::new().unwrap();
    let event = write_event(dir.path(), "opened", false, "octo-org/octo-repo");

    backporter(dir.path())
        .args(["action", "--repository", "octo-org/octo-repo", "--event-path"])
        .arg(&event)
        .assert()
        .success();
}

#[test]
fn test_action_ignores_event_from_other_repository() {
    let dir = TempDir::new().unwrap();
    let event = write_event(dir.path(), "closed", true, "someone/fork");

    backporter(dir.path())
        .env("GITHUB_REPOSITORY", "octo-org/octo-repo")
        .env("GITHUB_EVENT_PATH", &event)
        .arg("action")
        .assert()
        .success();
}

#[test]
fn test_action_with_missing_event_file_fails() {
    let dir = TempDir::new().unwrap();

    backporter(dir.path())
        .args([
            "action",
            "--repository",
            "octo-org/octo-repo",
            "--event-path",
            "missing.json",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read event payload"));
}
