//! Output flow control for one HTTP/2 stream or connection.
//!
//! The inbound frame path credits window through [`OutputFlowControl::advance`]
//! and [`OutputFlowControl::try_update_window`]; producers reserve window
//! through [`OutputFlowControl::try_reserve`] or [`OutputFlowControl::reserve`]
//! and suspend on an [`AvailabilityWaiter`] while none is available.
//!
//! All state lives behind one mutex. Checking the window and registering a
//! waiter happen in the same critical section as every drain, which rules
//! out lost wakeups and double delivery. The lock is never held across an
//! `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::signal::AvailabilityWaiter;
use super::waiter::{WaiterPool, DEFAULT_MAX_SPARE};
use super::window::FlowWindow;
use crate::error::{FlowControlError, Result};

#[derive(Debug)]
struct State {
    window: FlowWindow,
    waiters: WaiterPool,
}

impl State {
    /// Wake queued waiters in FIFO order while window is positive.
    ///
    /// Every eligible waiter is woken; each re-checks the window and
    /// re-registers if it lost the race for the available bytes.
    fn wake_eligible(&mut self) {
        let mut woken = 0usize;
        while self.window.available() > 0 {
            let Some(signal) = self.waiters.drain_one_if_any() else {
                break;
            };
            signal.try_complete();
            self.waiters.recycle(signal);
            woken += 1;
        }
        if woken > 0 {
            tracing::trace!(
                woken,
                available = self.window.available(),
                "Woke flow control waiters"
            );
        }
    }
}

/// Outcome of a single reservation attempt.
#[derive(Debug)]
pub enum Reservation {
    /// This many bytes were taken from the window.
    Granted(u32),
    /// No window; await the waiter, then try again.
    Wait(AvailabilityWaiter),
    /// The stream or connection is being torn down.
    Aborted,
}

/// Send-side flow controller shared by the frame reader and producers.
#[derive(Debug)]
pub struct OutputFlowControl {
    state: Mutex<State>,
}

impl OutputFlowControl {
    pub fn new(initial_window_size: u32) -> Self {
        Self::with_max_spare(initial_window_size, DEFAULT_MAX_SPARE)
    }

    /// Create a controller retaining at most `max_spare` idle signals.
    pub fn with_max_spare(initial_window_size: u32, max_spare: usize) -> Self {
        Self {
            state: Mutex::new(State {
                window: FlowWindow::new(initial_window_size),
                waiters: WaiterPool::with_max_spare(max_spare),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Every mutation is a single assignment, so a poisoned state is
        // still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bytes currently permitted to send (may be negative).
    pub fn available(&self) -> i64 {
        self.lock().window.available()
    }

    pub fn is_aborted(&self) -> bool {
        self.lock().window.is_aborted()
    }

    /// Number of producers currently queued for window.
    pub fn waiter_count(&self) -> usize {
        self.lock().waiters.count()
    }

    /// Register for a wakeup when window becomes available.
    ///
    /// The caller must have observed `!is_aborted()` and `available() <= 0`
    /// under the same exclusive context; use [`Self::try_reserve`] when the
    /// controller is shared across tasks.
    pub fn acquire_availability_waiter(&self) -> AvailabilityWaiter {
        let mut state = self.lock();
        debug_assert!(
            !state.window.is_aborted(),
            "availability waiter acquired after abort"
        );
        debug_assert!(
            state.window.available() <= 0,
            "availability waiter acquired with {} bytes available",
            state.window.available()
        );
        state.waiters.register_or_reuse()
    }

    /// Take up to `max` bytes of window, or register a waiter if none.
    pub fn try_reserve(&self, max: u32) -> Reservation {
        let mut state = self.lock();
        if state.window.is_aborted() {
            return Reservation::Aborted;
        }
        let available = state.window.available();
        if available > 0 {
            let granted = u32::try_from(available).map_or(max, |a| a.min(max));
            state.window.consume(granted);
            return Reservation::Granted(granted);
        }
        Reservation::Wait(state.waiters.register_or_reuse())
    }

    /// Wait until at least one byte (and at most `max`) can be sent.
    ///
    /// Returns [`FlowControlError::Aborted`] if the controller is aborted
    /// before or while waiting. `max == 0` returns immediately.
    pub async fn reserve(&self, max: u32) -> Result<u32> {
        if max == 0 {
            return Ok(0);
        }
        loop {
            match self.try_reserve(max) {
                Reservation::Granted(n) => return Ok(n),
                Reservation::Aborted => return Err(FlowControlError::Aborted),
                Reservation::Wait(waiter) => waiter.wait().await,
            }
        }
    }

    /// Debit bytes already written to the peer.
    pub fn consume(&self, bytes: u32) {
        let mut state = self.lock();
        if state.window.is_aborted() {
            return;
        }
        state.window.consume(bytes);
    }

    /// Credit a WINDOW_UPDATE increment and wake eligible waiters.
    pub fn advance(&self, bytes: u32) {
        let mut state = self.lock();
        if state.window.is_aborted() {
            return;
        }
        state.window.advance(bytes);
        state.wake_eligible();
    }

    /// Apply a signed window delta and wake eligible waiters.
    ///
    /// `delta` is negative when SETTINGS_INITIAL_WINDOW_SIZE shrinks with
    /// streams open; the window may then go negative, which is legal.
    /// Returns `false` if the result would leave `±(2^31-1)`. Updates to an
    /// aborted controller are ignored and reported as applied.
    pub fn try_update_window(&self, delta: i64) -> bool {
        self.update_window(delta).is_ok()
    }

    /// [`Self::try_update_window`] reporting rejection as an error.
    pub fn update_window(&self, delta: i64) -> Result<()> {
        let mut state = self.lock();
        if state.window.is_aborted() {
            return Ok(());
        }
        if !state.window.try_update_window(delta) {
            let available = state.window.available();
            tracing::warn!(available, delta, "Rejected flow control window update");
            return Err(FlowControlError::WindowOverflow { available, delta });
        }
        state.wake_eligible();
        Ok(())
    }

    /// Abort and release every queued producer.
    ///
    /// The aborted flag is set before any waiter is completed, so a woken
    /// producer always observes it.
    pub fn abort(&self) {
        let mut state = self.lock();
        state.window.abort();
        let mut released = 0usize;
        while let Some(signal) = state.waiters.drain_one_if_any() {
            signal.try_complete();
            state.waiters.recycle(signal);
            released += 1;
        }
        tracing::debug!(released, "Output flow control aborted");
    }

    /// Start over with a fresh window for a recycled stream.
    ///
    /// The previous stream must have drained all of its waiters.
    pub fn reset(&self, initial_window_size: u32) {
        let mut state = self.lock();
        debug_assert!(
            state.waiters.is_empty(),
            "waiter queue should have been emptied by the previous stream"
        );
        state.window = FlowWindow::new(initial_window_size);
        tracing::trace!(initial_window_size, "Output flow control reset");
    }
}
