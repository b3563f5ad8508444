//! Error types for output flow control.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FlowControlError>;

/// Errors surfaced by the flow controller.
///
/// Invariant violations (registering a waiter with window available,
/// resetting with queued waiters) are not represented here; they are
/// defects in the caller and trip debug assertions instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlowControlError {
    /// Applying the delta would move the window outside `±(2^31-1)`.
    ///
    /// The caller decides whether this is a stream or connection error.
    #[error("flow control window overflow: available {available}, delta {delta}")]
    WindowOverflow { available: i64, delta: i64 },

    /// The stream or connection was torn down while waiting for window.
    #[error("flow control aborted")]
    Aborted,
}
