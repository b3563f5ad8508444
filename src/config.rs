//! Configuration parsing for the flow control simulator.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Defaults matching the HTTP/2 initial window size

use clap::Parser;

use crate::flow::waiter::DEFAULT_MAX_SPARE;
use crate::flow::DEFAULT_INITIAL_WINDOW_SIZE;

/// outflow-sim: drive producers through one HTTP/2 output flow controller.
#[derive(Parser, Debug, Clone)]
#[command(name = "outflow-sim")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Initial connection window size in bytes
    #[arg(long, env = "OUTFLOW_INITIAL_WINDOW", default_value_t = DEFAULT_INITIAL_WINDOW_SIZE)]
    pub initial_window: u32,

    /// Number of concurrent producers sharing the window
    #[arg(short, long, env = "OUTFLOW_PRODUCERS", default_value_t = 4)]
    pub producers: usize,

    /// Bytes each producer sends before finishing
    #[arg(long, env = "OUTFLOW_BYTES_PER_PRODUCER", default_value_t = 262_144)]
    pub bytes_per_producer: u64,

    /// Largest DATA frame a producer writes at once
    #[arg(long, env = "OUTFLOW_FRAME_SIZE", default_value_t = 16_384)]
    pub frame_size: u32,

    /// WINDOW_UPDATE increment granted by the simulated peer
    #[arg(long, env = "OUTFLOW_UPDATE_SIZE", default_value_t = 32_768)]
    pub update_size: u32,

    /// Delay between WINDOW_UPDATE frames in milliseconds
    #[arg(long, env = "OUTFLOW_UPDATE_INTERVAL_MS", default_value_t = 5)]
    pub update_interval_ms: u64,

    /// Shrink the initial window by this many bytes before the first update
    #[arg(long, env = "OUTFLOW_SHRINK_BY", default_value_t = 0)]
    pub shrink_by: u32,

    /// Idle completion signals retained for reuse
    #[arg(long, env = "OUTFLOW_MAX_SPARE_WAITERS", default_value_t = DEFAULT_MAX_SPARE)]
    pub max_spare_waiters: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// A small, fast configuration for tests.
    pub fn test_config() -> Self {
        Self {
            initial_window: 1024,
            producers: 3,
            bytes_per_producer: 4096,
            frame_size: 512,
            update_size: 1024,
            update_interval_ms: 1,
            shrink_by: 0,
            max_spare_waiters: 4,
            log_level: "debug".into(),
            json: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_window: DEFAULT_INITIAL_WINDOW_SIZE,
            producers: 4,
            bytes_per_producer: 262_144,
            frame_size: 16_384,
            update_size: 32_768,
            update_interval_ms: 5,
            shrink_by: 0,
            max_spare_waiters: DEFAULT_MAX_SPARE,
            log_level: "info".into(),
            json: false,
        }
    }
}
