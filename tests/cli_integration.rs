//! Integration tests for CLI commands.
//!
//! These tests verify that CLI commands work correctly without
//! requiring a system bus, a running daemon or GPIO hardware.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a Command for the led-indicator binary
fn led_indicator() -> Command {
    Command::cargo_bin("led-indicator").unwrap()
}

#[test]
fn test_help_command() {
    led_indicator()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("GPIO LED indicator"))
        .stdout(predicate::str::contains("service"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("policyfile"))
        .stdout(predicate::str::contains("unitfile"))
        .stdout(predicate::str::contains("--service-name"));
}

#[test]
fn test_version_command() {
    led_indicator()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("led-indicator"));
}

#[test]
fn test_service_help() {
    led_indicator()
        .args(["service", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--chipname"))
        .stdout(predicate::str::contains("--line"));
}

#[test]
fn test_policyfile_defaults() {
    led_indicator()
        .arg("policyfile")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<!DOCTYPE busconfig"))
        .stdout(predicate::str::contains(
            r#"<allow own="com.walbrix.LedIndicatorService"/>"#,
        ))
        .stdout(predicate::str::contains(
            r#"<allow send_interface="com.walbrix.LedIndicator"/>"#,
        ));
}

#[test]
fn test_policyfile_with_global_options() {
    led_indicator()
        .args([
            "--service-name=org.example.Led",
            "--interface-name=org.example.Led1",
            "policyfile",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<allow own="org.example.Led"/>"#))
        .stdout(predicate::str::contains(
            r#"<allow send_interface="org.example.Led1"/>"#,
        ));
}

#[test]
fn test_unitfile_defaults() {
    led_indicator()
        .arg("unitfile")
        .assert()
        .success()
        .stdout(predicate::str::contains("Type=dbus"))
        .stdout(predicate::str::contains(
            "BusName=com.walbrix.LedIndicatorService",
        ))
        .stdout(predicate::str::is_match(r"(?m)^ExecStart=/\S*led-indicator service$").unwrap());
}

#[test]
fn test_unitfile_non_default_options() {
    led_indicator()
        .args([
            "-s",
            "org.example.Led",
            "unitfile",
            "--chipname=gpiochip4",
            "--line=17",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("BusName=org.example.Led"))
        .stdout(predicate::str::contains(
            " --service-name=org.example.Led service --chipname=gpiochip4 --line=17",
        ));
}

#[test]
fn test_unitfile_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[led]\nline = 5").unwrap();

    led_indicator()
        .arg("--config")
        .arg(file.path())
        .arg("unitfile")
        .assert()
        .success()
        .stdout(predicate::str::contains(" service --line=5"));
}

#[test]
fn test_unitfile_keeps_config_file_only_settings() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[led]\nblink_half_period_ms = 1000\npoll_interval_ms = 200").unwrap();
    let canonical = file.path().canonicalize().unwrap();

    led_indicator()
        .arg("--config")
        .arg(file.path())
        .arg("unitfile")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            " --config={} service",
            canonical.display()
        )))
        .stdout(predicate::str::contains(
            " service --blink-half-period-ms=1000 --poll-interval-ms=200",
        ));
}

#[test]
fn test_unitfile_timing_flags() {
    led_indicator()
        .args(["unitfile", "--blink-half-period-ms", "1000", "--poll-interval-ms", "200"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            " service --blink-half-period-ms=1000 --poll-interval-ms=200",
        ));
}

#[test]
fn test_get_without_daemon_fails() {
    led_indicator()
        .args(["-s", "org.example.NoSuchLed", "get"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot reach LED indicator service"));
}

#[test]
fn test_set_without_daemon_fails() {
    led_indicator()
        .args(["-s", "org.example.NoSuchLed", "set", "on"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot reach LED indicator service"));
}

#[test]
fn test_command_line_beats_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[led]\nline = 5").unwrap();

    led_indicator()
        .arg("--config")
        .arg(file.path())
        .args(["unitfile", "--line", "6"])
        .assert()
        .success()
        .stdout(predicate::str::contains(" service --line=6"))
        .stdout(predicate::str::contains("--line=5").not());
}

#[test]
fn test_missing_config_file() {
    led_indicator()
        .args(["--config", "/nonexistent/led-indicator.toml", "policyfile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_invalid_service_name() {
    led_indicator()
        .args(["--service-name", "not a bus name", "policyfile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid service name"));
}

#[test]
fn test_invalid_line_number() {
    led_indicator()
        .args(["unitfile", "--line", "thirteen"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_set_requires_action() {
    led_indicator()
        .arg("set")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<ACTION>"));
}

#[test]
fn test_missing_subcommand() {
    led_indicator()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
