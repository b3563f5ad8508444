//! Test utilities shared by the integration tests.
//!
//! Provides:
//! - Polling helper for conditions reached by other tasks
//! - Producer task spawning against a shared controller

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use outflow::{FlowControlError, OutputFlowControl};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Wait for a condition to become true with timeout.
///
/// # Returns
///
/// `true` if condition was met, `false` if timeout expired
pub async fn wait_for<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

/// Spawn a producer that reserves once and reports `(name, result)`.
pub fn spawn_reserver(
    name: &'static str,
    flow: Arc<OutputFlowControl>,
    max: u32,
    done: mpsc::UnboundedSender<(&'static str, Result<u32, FlowControlError>)>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = flow.reserve(max).await;
        let _ = done.send((name, result));
    })
}
