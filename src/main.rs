//! outflow-sim: exercise HTTP/2 output flow control in-process.
//!
//! # Usage
//!
//! ```bash
//! outflow-sim --producers 8 --initial-window 65535 --shrink-by 70000
//! ```
//!
//! Environment variables can also be used:
//! - `OUTFLOW_PRODUCERS`: Number of concurrent producers
//! - `OUTFLOW_INITIAL_WINDOW`: Initial connection window
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use outflow::config::Config;
use outflow::observability::tracing::init_tracing;
use outflow::sim::run_simulation;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Ctrl+C aborts the controller; producers stop at their next wakeup
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        tracing::info!("Received Ctrl+C, initiating shutdown...");
        let _ = shutdown_tx.send(true);
    });

    let report = run_simulation(&config, shutdown_rx).await?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}
