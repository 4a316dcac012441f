//! End-to-end tests for the chatmark binary

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn chatmark() -> Command {
    Command::cargo_bin("chatmark").unwrap()
}

#[test]
fn test_cli_help() {
    chatmark()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_render_from_stdin() {
    chatmark()
        .args(["render", "-"])
        .write_stdin("Energy is $E=mc^2$ [1]")
        .assert()
        .success()
        .stdout(predicate::str::contains("class=\"math math-inline\""))
        .stdout(predicate::str::contains("class=\"citation\""));
}

#[test]
fn test_config_file_disables_math() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("chatmark.toml");
    fs::write(&config, "[parser]\nmath = false\n").unwrap();

    chatmark()
        .arg("--config")
        .arg(&config)
        .args(["render", "-"])
        .write_stdin("cost $5 and $6")
        .assert()
        .success()
        .stdout(predicate::str::contains("math").not());
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("chatmark.toml");
    fs::write(&config, "[interpreter]\nmax_unwrap_depth = 0\n").unwrap();

    chatmark()
        .arg("--config")
        .arg(&config)
        .arg("extensions")
        .assert()
        .failure();
}

#[test]
fn test_interpret_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("message.md");
    fs::write(
        &input,
        "<details type=\"tool_calls\" done=\"true\" id=\"c1\" name=\"lookup\" result=\"&quot;{\\&quot;a\\&quot;:1}&quot;\">\n<summary>x</summary>\n</details>\n",
    )
    .unwrap();

    chatmark()
        .arg("interpret")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"structured_json\""));
}

#[test]
fn test_missing_input_fails() {
    chatmark()
        .args(["lex", "/nonexistent/chatmark-input.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
