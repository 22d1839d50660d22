//! End-to-end tests of the `firmfix` binary.
//!
//! Only the in-process passes are enabled so results do not depend on installed tools.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn firmfix() -> Command {
    Command::cargo_bin("firmfix").expect("firmfix binary")
}

fn offline(cmd: &mut Command) -> &mut Command {
    cmd.args(["--no-compile", "--no-static-analysis"])
        .env_remove("RUST_LOG")
        .env_remove("FIRMFIX_MODEL")
        .env_remove("FIRMFIX_FALLBACK_MODEL")
        .env_remove("FIRMFIX_ENDPOINT")
}

fn create_temp_dir(files: &[(&str, &str)]) -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    for (rel, contents) in files {
        let path = td.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
    td
}

#[test]
fn help_lists_check_command() {
    firmfix()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"));
}

#[test]
fn missing_directory_exits_with_one() {
    let temp = create_temp_dir(&[]);
    let mut cmd = firmfix();
    cmd.arg("check").arg(temp.path().join("does-not-exist"));
    offline(&mut cmd).assert().code(1);
}

#[test]
fn clean_directory_exits_zero() {
    let temp = create_temp_dir(&[("src/led.c", "int level = 0;\n")]);
    let mut cmd = firmfix();
    cmd.arg("check").arg(temp.path());
    offline(&mut cmd)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Errors:   0"));
}

#[test]
fn remaining_errors_exit_two() {
    let temp = create_temp_dir(&[("a.c", "int x\n")]);
    let mut cmd = firmfix();
    cmd.arg("check").arg(temp.path());
    offline(&mut cmd)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("a.c:1:0 [syntax]"));
}

#[test]
fn json_output_follows_result_shape() {
    let temp = create_temp_dir(&[("a.c", "int x\n")]);
    let mut cmd = firmfix();
    cmd.arg("check").arg(temp.path()).args(["--format", "json"]);
    let output = offline(&mut cmd).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["totalErrors"], 1);
    assert_eq!(json["errors"][0]["type"], "syntax");
    assert_eq!(json["errors"][0]["severity"], "error");
    assert!(json.get("appliedFixes").is_none());
}

#[test]
fn config_file_can_disable_a_pass() {
    let temp = create_temp_dir(&[
        ("a.c", "int x\n"),
        ("firmfix.toml", "[passes]\nsyntax = false\n"),
    ]);
    let mut cmd = firmfix();
    cmd.arg("check").arg(temp.path());
    offline(&mut cmd).assert().code(0);
}

#[test]
fn invalid_config_is_a_hard_failure() {
    let temp = create_temp_dir(&[("a.c", "int x = 0;\n"), ("firmfix.toml", "[passes\n")]);
    let mut cmd = firmfix();
    cmd.arg("check").arg(temp.path());
    offline(&mut cmd).assert().code(1);
}

#[test]
fn file_flag_limits_the_check() {
    let temp = create_temp_dir(&[("a.c", "int x\n"), ("b.c", "int y = 1;\n")]);
    let mut cmd = firmfix();
    cmd.arg("check").arg(temp.path()).args(["--file", "b.c"]);
    offline(&mut cmd).assert().code(0);
}

#[test]
fn unreachable_inference_service_leaves_files_untouched() {
    let temp = create_temp_dir(&[("a.c", "int x\n")]);
    let mut cmd = firmfix();
    cmd.arg("check")
        .arg(temp.path())
        .args(["--fix", "--endpoint", "http://127.0.0.1:9/api/generate"]);
    offline(&mut cmd)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("After repair:"))
        .stdout(predicate::str::contains("Applied:  0"));

    assert_eq!(fs::read_to_string(temp.path().join("a.c")).unwrap(), "int x\n");
}

#[test]
fn unknown_format_is_rejected() {
    let temp = create_temp_dir(&[]);
    firmfix()
        .arg("check")
        .arg(temp.path())
        .args(["--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
