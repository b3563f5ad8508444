//! End-to-end tests for the simulation driver and CLI.
//!
//! Tests:
//! - Every producer finishes when the peer keeps granting window
//! - Window accounting balances with a negative initial-size change
//! - Shutdown aborts producers waiting for window
//! - CLI help and JSON report

use std::process::Command;
use std::time::Duration;

use outflow::config::Config;
use outflow::observability::tracing::init_test_tracing;
use outflow::sim::run_simulation;
use tokio::sync::watch;

#[tokio::test]
async fn test_all_producers_finish() {
    init_test_tracing();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let config = Config::test_config();

    let report = run_simulation(&config, shutdown_rx).await.unwrap();

    assert!(!report.aborted);
    assert_eq!(report.producers.len(), config.producers);
    for p in &report.producers {
        assert_eq!(p.bytes_sent, config.bytes_per_producer);
        assert!(!p.aborted);
    }
    // The initial window covers only part of the demand.
    assert!(report.window_updates > 0);
}

#[tokio::test]
async fn test_accounting_balances_after_shrink() {
    init_test_tracing();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let config = Config {
        shrink_by: 3000,
        ..Config::test_config()
    };

    let report = run_simulation(&config, shutdown_rx).await.unwrap();

    let supplied = i64::from(config.initial_window) - i64::from(config.shrink_by)
        + i64::try_from(report.bytes_granted).unwrap();
    let sent = i64::try_from(report.total_sent()).unwrap();
    assert_eq!(report.final_window, supplied - sent);
    assert_eq!(
        report.total_sent(),
        config.bytes_per_producer * config.producers as u64
    );
}

#[tokio::test]
async fn test_shutdown_aborts_waiting_producers() {
    init_test_tracing();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    // Window never reopens: the peer waits an hour between updates.
    let config = Config {
        initial_window: 0,
        update_interval_ms: 3_600_000,
        shrink_by: 1,
        ..Config::test_config()
    };

    let sim = tokio::spawn(async move { run_simulation(&config, shutdown_rx).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown_tx.send(true).unwrap();

    let report = tokio::time::timeout(Duration::from_secs(5), sim)
        .await
        .expect("simulation did not stop")
        .unwrap()
        .unwrap();
    assert!(report.aborted);
    assert!(report.producers.iter().all(|p| p.aborted));
    assert_eq!(report.total_sent(), 0);
}

#[test]
fn test_cli_help_output() {
    let output = Command::new(env!("CARGO_BIN_EXE_outflow-sim"))
        .arg("--help")
        .output()
        .expect("failed to run");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for flag in ["--initial-window", "--producers", "--shrink-by", "--json"] {
        assert!(stdout.contains(flag), "help should mention {flag}");
    }
}

#[test]
fn test_cli_json_report() {
    let output = Command::new(env!("CARGO_BIN_EXE_outflow-sim"))
        .args([
            "--producers",
            "2",
            "--bytes-per-producer",
            "2048",
            "--initial-window",
            "512",
            "--update-size",
            "1024",
            "--update-interval-ms",
            "1",
            "--json",
        ])
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to run");
    assert!(
        output.status.success(),
        "run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["aborted"], false);
    assert_eq!(report["producers"].as_array().unwrap().len(), 2);
    assert_eq!(report["producers"][0]["bytes_sent"], 2048);
}
