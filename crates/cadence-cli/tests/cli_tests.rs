//! Integration tests for the cadence binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn cadence() -> Result<Command, Box<dyn std::error::Error>> {
    Ok(Command::cargo_bin("cadence")?)
}

#[test]
fn test_cli_help() -> TestResult {
    cadence()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fixed-rate packet streaming"));
    Ok(())
}

#[test]
fn test_cli_version() -> TestResult {
    cadence()?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cadence"));
    Ok(())
}

#[test]
fn test_timer_prints_one_line_per_tick() -> TestResult {
    let output = cadence()?
        .args(["timer", "--strategy", "blocking", "--frequency", "200", "-n", "3"])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let intervals: Vec<u64> = stdout
        .lines()
        .map(str::parse)
        .collect::<Result<_, _>>()?;
    assert_eq!(intervals.len(), 3);
    Ok(())
}

#[test]
fn test_unsupported_config_extension_exits_with_4() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("cadence.toml");
    fs::write(&path, "frequency_hz = 100")?;

    cadence()?
        .args(["timer", "--config"])
        .arg(&path)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unsupported configuration format"));
    Ok(())
}

#[test]
fn test_wrong_schema_exits_with_4() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("cadence.json");
    fs::write(&path, r#"{"schema": "cadence.config/9"}"#)?;

    cadence()?
        .args(["run", "--config"])
        .arg(&path)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("unsupported schema"));
    Ok(())
}

#[test]
fn test_out_of_range_frequency_flag_is_rejected() -> TestResult {
    cadence()?
        .args(["run", "--unprivileged", "--frequency", "20000"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("frequency_hz"));
    Ok(())
}
