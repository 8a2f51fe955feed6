//! End-to-end CLI smoke tests through the public binary interface.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Isolated data directory plus preconfigured command builder.
struct TestEnv {
    data_dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            data_dir: TempDir::new().expect("create temp data dir"),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("satchel").expect("binary builds");
        cmd.arg("--data-dir")
            .arg(self.data_dir.path())
            .arg("--account")
            .arg("test");
        cmd
    }
}

#[test]
fn new_then_ls_shows_the_note() {
    let env = TestEnv::new();
    env.cmd()
        .args(["new", "Grocery list", "--content", "milk eggs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 'Grocery list'"));

    env.cmd()
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("Grocery list"));
}

#[test]
fn trash_hides_note_and_restore_brings_it_back() {
    let env = TestEnv::new();
    env.cmd()
        .args(["new", "Ephemeral", "--content", "x"])
        .assert()
        .success();

    // Resolve via the listed prefix.
    let out = env.cmd().arg("ls").output().expect("run ls");
    let stdout = String::from_utf8(out.stdout).expect("utf8");
    let prefix = stdout.split_whitespace().next().expect("id prefix").to_string();

    env.cmd()
        .args(["trash", &prefix])
        .assert()
        .success()
        .stdout(predicate::str::contains("Trashed 1 note(s)"));
    env.cmd()
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("No notes found"));

    env.cmd()
        .args(["restore", &prefix])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 'Ephemeral'"));
    env.cmd()
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ephemeral"));
}

#[test]
fn json_output_is_machine_readable() {
    let env = TestEnv::new();
    env.cmd()
        .args(["new", "Structured", "--content", "x", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Structured\""));

    let out = env
        .cmd()
        .args(["ls", "--format", "json"])
        .output()
        .expect("run ls");
    let parsed: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("ls --format json emits valid JSON");
    assert_eq!(parsed["data"][0]["title"], "Structured");
}

#[test]
fn source_attribution_derives_tags() {
    let env = TestEnv::new();
    env.cmd()
        .args([
            "new",
            "Quote",
            "--content",
            "x",
            "--source",
            "《The C Programming》, Ritchie",
        ])
        .assert()
        .success();

    env.cmd()
        .arg("tags")
        .assert()
        .success()
        .stdout(predicate::str::contains("The C Programming"))
        .stdout(predicate::str::contains("Ritchie"));
}

#[test]
fn unknown_id_fails_with_error() {
    let env = TestEnv::new();
    env.cmd()
        .args(["show", "01HQ3K5M7NXJK4QZPW8V2R6T9Y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("note not found"));
}

#[test]
fn empty_trash_respects_yes_flag() {
    let env = TestEnv::new();
    env.cmd()
        .args(["new", "Goner", "--content", "x"])
        .assert()
        .success();
    let out = env.cmd().arg("ls").output().expect("run ls");
    let stdout = String::from_utf8(out.stdout).expect("utf8");
    let prefix = stdout.split_whitespace().next().expect("id prefix").to_string();

    env.cmd().args(["trash", &prefix]).assert().success();
    env.cmd()
        .args(["empty-trash", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 note(s)"));
    env.cmd()
        .arg("trash-stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Trashed:       0"));
}

#[test]
fn stats_summarize_collections() {
    let env = TestEnv::new();
    env.cmd()
        .args(["new", "One", "--content", "abc"])
        .assert()
        .success();
    env.cmd()
        .args(["draft", "new", "WIP", "--content", "d"])
        .assert()
        .success();

    env.cmd()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Notes:      1"))
        .stdout(predicate::str::contains("Drafts:     1"));
}

#[test]
fn draft_publish_moves_into_active() {
    let env = TestEnv::new();
    env.cmd()
        .args(["draft", "new", "Sketch", "--content", "rough"])
        .assert()
        .success();

    let out = env.cmd().args(["draft", "ls"]).output().expect("run draft ls");
    let stdout = String::from_utf8(out.stdout).expect("utf8");
    let prefix = stdout.split_whitespace().next().expect("id prefix").to_string();

    env.cmd()
        .args(["draft", "publish", &prefix])
        .assert()
        .success()
        .stdout(predicate::str::contains("Published 'Sketch'"));
    env.cmd()
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sketch"));
    env.cmd()
        .args(["draft", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No drafts"));
}
