//! Outflow: HTTP/2 output flow control with cooperative producer suspension.
//!
//! Tracks how many bytes a stream or connection may send before the peer
//! grants more window, and parks producers on reusable completion signals
//! while none is available.
//!
//! # Architecture
//!
//! - **Signed windows**: the window may go negative after the peer shrinks
//!   SETTINGS_INITIAL_WINDOW_SIZE; only results outside `±(2^31-1)` fail
//! - **FIFO wakeups**: producers are released in registration order
//! - **Pooled signals**: drained signals are reset and reused
//! - **Abort**: releases every producer, who then observe the aborted state
//!
//! # Modules
//!
//! - [`config`]: CLI and environment configuration for the simulator
//! - [`error`]: Flow control errors
//! - [`flow`]: Window, waiter pool and the output flow controller
//! - [`observability`]: Tracing setup
//! - [`sim`]: In-process producer/peer simulation

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // flow::output::OutputFlowControl is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc       // Panic docs can be verbose
)]

pub mod config;
pub mod error;
pub mod flow;
pub mod observability;
pub mod sim;

pub use error::{FlowControlError, Result};
pub use flow::{AvailabilityWaiter, OutputFlowControl, Reservation};
