//! CLI options interaction tests
//!
//! These run the `npt` binary end to end. Runs that would touch the network
//! are avoided: the only completed runs use zero samples.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "TARGET_HOST",
    "SAMPLE_SIZE",
    "METRICS",
    "SAMPLE_INTERVAL_MS",
    "ECHO_TIMEOUT_MS",
    "DNS_DOMAINS",
    "MTU_MAX_SIZE",
    "MTU_MIN_SIZE",
    "MTU_STEP",
    "MTU_TIMEOUT_SECS",
    "BANDWIDTH_DOWNLOAD_URL",
    "BANDWIDTH_UPLOAD_URL",
    "ENABLE_COLOR",
    "LOG_FILE",
    "LOG_LEVEL",
];

/// Command running in an empty directory with a clean environment
fn create_test_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("npt").unwrap();
    cmd.current_dir(dir.path());
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_options() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--target"))
        .stdout(predicate::str::contains("--samples"))
        .stdout(predicate::str::contains("--metrics"))
        .stdout(predicate::str::contains("--mtu-step"));
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_metric_exits_with_config_error() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--metrics", "latency", "warp_speed", "--no-save", "--no-color"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("warp_speed"));
}

#[test]
fn test_invalid_mtu_bounds_exit_with_config_error() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--mtu-min", "1500", "--mtu-max", "1000", "--no-save", "--no-color"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("MTU"));
}

#[test]
fn test_malformed_sample_count_rejected_by_parser() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--samples", "many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--samples"));
}

#[test]
fn test_invalid_env_file_value_is_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env"), "SAMPLE_SIZE=lots\n").unwrap();

    create_test_cmd(&dir)
        .args(["--no-save", "--no-color"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("SAMPLE_SIZE"));
}

#[test]
fn test_zero_sample_run_completes_with_absent_results() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--metrics", "latency,jitter", "--samples", "0", "--no-save", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Network Performance Test Report ==="))
        .stdout(predicate::str::contains("LATENCY:\n  Test failed or not executed"))
        .stdout(predicate::str::contains("JITTER:\n  Test failed or not executed"));

    // --no-save leaves nothing behind
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_report_written_to_output_path() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("out").join("report.json");

    create_test_cmd(&dir)
        .args(["--metrics", "packet_loss", "--samples", "0", "--no-color", "--output"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report saved to"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({ "packet_loss": null }));
}

#[test]
fn test_default_report_name_is_timestamped() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--metrics", "latency", "--samples", "0", "--no-color"])
        .assert()
        .success();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("network_test_report_"));
    assert!(names[0].ends_with(".json"));
}

#[test]
fn test_log_file_receives_probe_events() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("npt.log");

    create_test_cmd(&dir)
        .args(["--metrics", "latency", "--samples", "0", "--no-save", "--no-color", "--log-file"])
        .arg(&log)
        .assert()
        .success();

    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("latency"));
}

#[test]
fn test_env_help_lists_variables() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--env-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Supported Environment Variables:"))
        .stdout(predicate::str::contains("MTU_TIMEOUT_SECS"));

    // Nothing measured, nothing saved
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_init_env_writes_example_and_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("sample.env");

    create_test_cmd(&dir)
        .arg("--init-env")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("Example configuration written to"));

    let contents = fs::read_to_string(&target).unwrap();
    assert!(contents.contains("# TARGET_HOST=8.8.8.8"));

    create_test_cmd(&dir)
        .args(["--no-color", "--init-env"])
        .arg(&target)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_check_env_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env"), "TARGET_HOST=1.1.1.1\nMETRICS=latency,mtu\n").unwrap();

    create_test_cmd(&dir)
        .arg("--check-env")
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment configuration is valid"));
}

#[test]
fn test_check_env_reports_bad_file_and_variables() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env"), "SAMPLE_SIZE=lots\n").unwrap();

    create_test_cmd(&dir)
        .args(["--no-color", "--check-env"])
        .env("ECHO_TIMEOUT_MS", "0")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("SAMPLE_SIZE=lots"))
        .stderr(predicate::str::contains("ECHO_TIMEOUT_MS"))
        .stderr(predicate::str::contains("2 invalid configuration value(s)"));
}
