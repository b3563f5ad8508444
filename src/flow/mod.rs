//! Output flow control and producer suspension.
//!
//! Provides:
//! - Signed window arithmetic per RFC 9113 Section 6.9
//! - Reusable completion signals queued in FIFO order
//! - The shared controller tying window changes to producer wakeups

pub mod output;
pub mod signal;
pub mod waiter;
pub mod window;

pub use output::{OutputFlowControl, Reservation};
pub use signal::{AvailabilityWaiter, CompletionSignal};
pub use waiter::WaiterPool;
pub use window::{FlowWindow, DEFAULT_INITIAL_WINDOW_SIZE, MAX_WINDOW_SIZE};
