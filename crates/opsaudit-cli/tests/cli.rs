//! Command-line behaviour that needs neither AWS nor root.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn opsaudit(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("opsaudit").unwrap();
    cmd.env("OPSAUDIT_CONFIG", config_dir.path().join("config.toml"))
        .env_remove("AWS_REGION")
        .env_remove("AWS_PROFILE")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    opsaudit(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("cost"))
        .stdout(predicate::str::contains("audit"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn cost_rejects_impossible_dates() {
    let dir = TempDir::new().unwrap();
    opsaudit(&dir)
        .args(["cost", "2024-13-01", "2024-02-01"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid date '2024-13-01'"));
}

#[test]
fn cost_rejects_loose_date_shapes() {
    let dir = TempDir::new().unwrap();
    opsaudit(&dir)
        .args(["cost", "2024-3-01", "2024-03-11"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn cost_rejects_backwards_period() {
    let dir = TempDir::new().unwrap();
    opsaudit(&dir)
        .args(["cost", "2024-03-10", "2024-03-01"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid period"));
}

#[test]
fn cost_rejects_wrong_arity() {
    let dir = TempDir::new().unwrap();
    opsaudit(&dir)
        .args(["cost", "2024-01-01", "2024-02-01", "2024-03-01"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected 0, 2 or 4 dates, got 3"));
}

#[test]
fn cost_without_dates_needs_a_terminal() {
    let dir = TempDir::new().unwrap();
    opsaudit(&dir)
        .arg("cost")
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a terminal"));
}

#[test]
fn config_path_honours_override() {
    let dir = TempDir::new().unwrap();
    let expected = dir.path().join("config.toml");
    opsaudit(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn config_set_then_show() {
    let dir = TempDir::new().unwrap();
    opsaudit(&dir)
        .args(["config", "set", "aws_region", "eu-central-1"])
        .assert()
        .success();

    opsaudit(&dir)
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""aws_region": "eu-central-1""#))
        .stdout(predicate::str::contains(r#""top": 10"#));
}

#[test]
fn config_set_rejects_unknown_keys() {
    let dir = TempDir::new().unwrap();
    opsaudit(&dir)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown config key"));
}
