//! In-process simulation of producers sharing one connection window.
//!
//! A simulated peer grants WINDOW_UPDATE increments on a timer while the
//! producers reserve window frame by frame. Optionally the peer first
//! shrinks the initial window size, which can drive the window negative.
//! A shutdown signal aborts the controller and releases every producer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::Serialize;
use tokio::sync::watch;

use crate::config::Config;
use crate::flow::{OutputFlowControl, Reservation};

/// Per-producer outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ProducerReport {
    pub id: usize,
    pub bytes_sent: u64,
    pub frames: u64,
    /// Times the producer suspended waiting for window.
    pub waits: u64,
    pub aborted: bool,
}

/// Outcome of a full simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub initial_window: u32,
    pub window_updates: u64,
    pub bytes_granted: u64,
    pub final_window: i64,
    pub aborted: bool,
    pub producers: Vec<ProducerReport>,
}

impl SimulationReport {
    pub fn total_sent(&self) -> u64 {
        self.producers.iter().map(|p| p.bytes_sent).sum()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "window: initial {} final {} ({} updates, {} bytes granted){}",
            self.initial_window,
            self.final_window,
            self.window_updates,
            self.bytes_granted,
            if self.aborted { " [aborted]" } else { "" }
        )?;
        for p in &self.producers {
            writeln!(
                f,
                "  producer {:>3}: {:>10} bytes in {:>6} frames, {:>5} waits{}",
                p.id,
                p.bytes_sent,
                p.frames,
                p.waits,
                if p.aborted { " [aborted]" } else { "" }
            )?;
        }
        write!(f, "total sent: {} bytes", self.total_sent())
    }
}

struct PeerOutcome {
    window_updates: u64,
    bytes_granted: u64,
    aborted: bool,
}

/// Run the simulation until every producer finishes or shutdown fires.
pub async fn run_simulation(
    config: &Config,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<SimulationReport> {
    if config.frame_size == 0 {
        bail!("frame size must be at least 1 byte");
    }
    if config.update_size == 0 {
        bail!("window update size must be at least 1 byte");
    }
    if config.update_interval_ms == 0 {
        bail!("window update interval must be at least 1 ms");
    }

    let flow = Arc::new(OutputFlowControl::with_max_spare(
        config.initial_window,
        config.max_spare_waiters,
    ));
    let (done_tx, done_rx) = watch::channel(false);

    tracing::info!(
        producers = config.producers,
        initial_window = config.initial_window,
        "Starting flow control simulation"
    );

    let peer = tokio::spawn(run_peer(
        Arc::clone(&flow),
        config.update_size,
        Duration::from_millis(config.update_interval_ms),
        config.shrink_by,
        done_rx,
        shutdown_rx,
    ));

    let handles: Vec<_> = (0..config.producers)
        .map(|id| {
            tokio::spawn(run_producer(
                id,
                Arc::clone(&flow),
                config.bytes_per_producer,
                config.frame_size,
            ))
        })
        .collect();

    let mut producers = Vec::with_capacity(handles.len());
    for result in futures::future::join_all(handles).await {
        producers.push(result?);
    }

    let _ = done_tx.send(true);
    let outcome = peer.await?;

    let report = SimulationReport {
        initial_window: config.initial_window,
        window_updates: outcome.window_updates,
        bytes_granted: outcome.bytes_granted,
        final_window: flow.available(),
        aborted: outcome.aborted || flow.is_aborted(),
        producers,
    };
    tracing::info!(
        total_sent = report.total_sent(),
        final_window = report.final_window,
        "Simulation finished"
    );
    Ok(report)
}

async fn run_producer(
    id: usize,
    flow: Arc<OutputFlowControl>,
    total: u64,
    frame_size: u32,
) -> ProducerReport {
    let mut report = ProducerReport {
        id,
        bytes_sent: 0,
        frames: 0,
        waits: 0,
        aborted: false,
    };

    while report.bytes_sent < total {
        let remaining = u32::try_from(total - report.bytes_sent).unwrap_or(u32::MAX);
        match flow.try_reserve(remaining.min(frame_size)) {
            Reservation::Granted(n) => {
                report.bytes_sent += u64::from(n);
                report.frames += 1;
                // Give other producers a turn, as a write scheduler would.
                tokio::task::yield_now().await;
            }
            Reservation::Wait(waiter) => {
                report.waits += 1;
                waiter.wait().await;
            }
            Reservation::Aborted => {
                tracing::debug!(id, sent = report.bytes_sent, "Producer observed abort");
                report.aborted = true;
                break;
            }
        }
    }

    tracing::debug!(
        id,
        sent = report.bytes_sent,
        frames = report.frames,
        waits = report.waits,
        "Producer finished"
    );
    report
}

async fn run_peer(
    flow: Arc<OutputFlowControl>,
    update_size: u32,
    interval: Duration,
    shrink_by: u32,
    mut done_rx: watch::Receiver<bool>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> PeerOutcome {
    let mut outcome = PeerOutcome {
        window_updates: 0,
        bytes_granted: 0,
        aborted: false,
    };

    if shrink_by > 0 {
        // SETTINGS_INITIAL_WINDOW_SIZE lowered with data already in flight.
        if let Err(e) = flow.update_window(-i64::from(shrink_by)) {
            tracing::warn!(error = %e, "Peer window shrink rejected");
        }
    }

    let shutdown = async move {
        while !*shutdown_rx.borrow_and_update() {
            if shutdown_rx.changed().await.is_err() {
                // Sender gone without requesting shutdown.
                std::future::pending::<()>().await;
            }
        }
    };
    tokio::pin!(shutdown);

    // First update one interval in, so the initial window is used up first.
    let start = tokio::time::Instant::now() + interval;
    let mut ticker = tokio::time::interval_at(start, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = done_rx.changed() => break,
            () = &mut shutdown => {
                tracing::info!("Shutdown requested, aborting flow control");
                flow.abort();
                outcome.aborted = true;
                break;
            }
            _ = ticker.tick() => {
                match flow.update_window(i64::from(update_size)) {
                    Ok(()) => {
                        outcome.window_updates += 1;
                        outcome.bytes_granted += u64::from(update_size);
                    }
                    Err(e) => tracing::warn!(error = %e, "Peer window update rejected"),
                }
            }
        }
    }

    outcome
}
