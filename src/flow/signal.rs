//! Reusable single-shot completion signal.
//!
//! A [`CompletionSignal`] is owned by the waiter pool. Each registration
//! hands the producer an [`AvailabilityWaiter`] that shares the same state
//! and resolves once the pool completes the signal. The signal carries no
//! payload; a woken producer must re-check the window.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Shared {
    completed: AtomicBool,
    notify: Notify,
}

/// Pool-side half of a completion signal.
#[derive(Debug, Default)]
pub struct CompletionSignal {
    shared: Arc<Shared>,
}

impl CompletionSignal {
    /// Create a pending signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out an awaitable handle to this signal.
    pub fn waiter(&self) -> AvailabilityWaiter {
        AvailabilityWaiter {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Complete the signal, waking whoever awaits it.
    ///
    /// Returns `true` on the first completion. Calling it again, or with no
    /// live waiter, is a no-op.
    pub fn try_complete(&self) -> bool {
        if self.shared.completed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.shared.notify.notify_waiters();
        true
    }

    pub fn is_completed(&self) -> bool {
        self.shared.completed.load(Ordering::Acquire)
    }

    /// Whether a producer still holds a waiter for this signal.
    pub fn is_observed(&self) -> bool {
        Arc::strong_count(&self.shared) > 1
    }

    /// Return the signal to pending so it can be registered again.
    ///
    /// Must only be called once no waiter handle is alive.
    pub fn reset(&mut self) {
        debug_assert!(!self.is_observed(), "signal reset while still awaited");
        self.shared.completed.store(false, Ordering::Release);
    }
}

/// Producer-side handle returned by waiter registration.
///
/// Dropping it without awaiting is allowed; the pool tolerates completing
/// an abandoned signal.
#[derive(Debug)]
pub struct AvailabilityWaiter {
    shared: Arc<Shared>,
}

impl AvailabilityWaiter {
    pub fn is_completed(&self) -> bool {
        self.shared.completed.load(Ordering::Acquire)
    }

    /// Suspend until the signal is completed.
    pub async fn wait(&self) {
        loop {
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            // Register interest before checking the flag so a completion
            // racing with this check is not lost.
            notified.as_mut().enable();
            if self.is_completed() {
                return;
            }
            notified.await;
        }
    }
}
