//! Integration tests for the offline CLI commands.
//!
//! Each test points `HOME` at a temporary directory so the user's real
//! configuration is never read or written.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run a CLI command with `home` as the home directory.
fn run_cli(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tidewatch"))
        .args(args)
        .env("HOME", home)
        .env_remove("OPENWEATHER_API_KEY")
        .output()
        .expect("Failed to execute CLI command")
}

/// Assert a command succeeded.
fn assert_success(output: &Output, context: &str) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!("{} failed:\nstdout: {}\nstderr: {}", context, stdout, stderr);
    }
}

#[test]
fn test_score_reference_voyage() {
    let home = TempDir::new().expect("Failed to create temp dir");

    let output = run_cli(
        home.path(),
        &[
            "score",
            "--wind",
            "12",
            "--wave",
            "2.5",
            "--base-co2",
            "450",
            "--distance",
            "300",
            "--speed",
            "12",
        ],
    );
    assert_success(&output, "score");

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("score prints JSON");
    let adjusted = report["adjusted_co2"].as_f64().unwrap();
    let delta = report["delta_weather"].as_f64().unwrap();
    assert!((adjusted - 515.25).abs() < 1e-9);
    assert!((delta - 65.25).abs() < 1e-9);
    assert!(report["esg_score"].as_u64().unwrap() <= 100);
}

#[test]
fn test_score_rejects_negative_baseline() {
    let home = TempDir::new().expect("Failed to create temp dir");

    let output = run_cli(
        home.path(),
        &[
            "score",
            "--wind",
            "3",
            "--wave",
            "0.5",
            "--base-co2=-10",
            "--distance",
            "100",
            "--speed",
            "10",
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Cannot score voyage"));
}

#[test]
fn test_config_init_then_show() {
    let home = TempDir::new().expect("Failed to create temp dir");

    let output = run_cli(home.path(), &["config", "init"]);
    assert_success(&output, "config init");
    let config_path = home.path().join(".tidewatch").join("config.ini");
    assert!(config_path.exists(), "config.ini should exist");

    let output = run_cli(home.path(), &["config", "show"]);
    assert_success(&output, "config show");
    let shown = String::from_utf8_lossy(&output.stdout);
    assert!(shown.contains("[weather]"));
    assert!(shown.contains("[esg]"));

    // A second init leaves the file alone.
    std::fs::write(&config_path, "[broadcast]\nsubscriber_buffer = 64\n").unwrap();
    let output = run_cli(home.path(), &["config", "init"]);
    assert_success(&output, "config init (existing)");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("subscriber_buffer = 64"));
}

#[test]
fn test_config_path_points_into_home() {
    let home = TempDir::new().expect("Failed to create temp dir");

    let output = run_cli(home.path(), &["config", "path"]);
    assert_success(&output, "config path");
    let printed = String::from_utf8_lossy(&output.stdout);
    assert!(printed.trim().ends_with(".tidewatch/config.ini"));
}

#[test]
fn test_invalid_config_is_reported() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let dir = home.path().join(".tidewatch");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.ini"), "[pipeline]\nmax_concurrent = none\n").unwrap();

    let output = run_cli(home.path(), &["config", "show"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration error"));
}
