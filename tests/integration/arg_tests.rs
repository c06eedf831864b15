//! These tests are mostly here just to ensure that invalid results will be
//! caught when passing arguments.

use assert_cmd::prelude::*;
use predicates::prelude::*;

use crate::util::batmond_command;

#[test]
fn test_version() {
    batmond_command().arg("-V").assert().success();
}

#[test]
fn test_invalid_arg() {
    batmond_command()
        .arg("--this-does-not-exist")
        .assert()
        .failure();
}

#[test]
fn test_small_rate() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("batmon.toml");

    batmond_command()
        .args(["-C", config_path.to_str().unwrap()])
        .arg("-r")
        .arg("249")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'--rate' must be greater"));
}

#[test]
fn test_bad_rate() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("batmon.toml");

    batmond_command()
        .args(["-C", config_path.to_str().unwrap()])
        .arg("-r")
        .arg("fast")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "'--rate' was set with an invalid value",
        ));
}

/// A oneshot run against missing telemetry sources must still produce a
/// state line; absent sources degrade the estimate, never the process.
#[test]
fn test_oneshot_with_missing_sources() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("batmon.toml");
    let missing = tmp.path().join("missing");
    let stat_pin = tmp.path().join("stat_pin_enable");

    batmond_command()
        .args(["-C", config_path.to_str().unwrap()])
        .args(["--gauge-uevent", missing.to_str().unwrap()])
        .args(["--gauge-registers", missing.to_str().unwrap()])
        .args(["--aux-uevent", missing.to_str().unwrap()])
        .args(["--charger-mode", missing.to_str().unwrap()])
        .args(["--charger-stat-pin", stat_pin.to_str().unwrap()])
        .arg("--oneshot")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("capacity:")
                .and(predicate::str::contains("charger: disconnected")),
        );

    // The default config file was created at the given location.
    assert!(config_path.exists());
}
