//! FIFO queue of reusable completion signals.
//!
//! Registration order is wakeup order. Completed signals are handed back
//! through [`WaiterPool::recycle`] and reused once their producer has
//! dropped its [`AvailabilityWaiter`], so sustained backpressure does not
//! allocate per wait.

use std::collections::VecDeque;

use super::signal::{AvailabilityWaiter, CompletionSignal};

/// Default number of drained signals retained for reuse.
pub const DEFAULT_MAX_SPARE: usize = 16;

#[derive(Debug)]
pub struct WaiterPool {
    queue: VecDeque<CompletionSignal>,
    spare: Vec<CompletionSignal>,
    max_spare: usize,
}

impl WaiterPool {
    pub fn new() -> Self {
        Self::with_max_spare(DEFAULT_MAX_SPARE)
    }

    /// Create a pool that retains at most `max_spare` drained signals.
    pub fn with_max_spare(max_spare: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            spare: Vec::new(),
            max_spare,
        }
    }

    /// Enqueue a pending signal and return its waiter.
    ///
    /// Reuses a spare signal whose previous waiter has been released,
    /// allocating only when none is free. The caller guarantees the window
    /// is not aborted and has no bytes available.
    pub fn register_or_reuse(&mut self) -> AvailabilityWaiter {
        let signal = match self.spare.iter().position(|s| !s.is_observed()) {
            Some(idx) => {
                let mut signal = self.spare.swap_remove(idx);
                signal.reset();
                signal
            }
            None => CompletionSignal::new(),
        };
        let waiter = signal.waiter();
        self.queue.push_back(signal);
        waiter
    }

    /// Remove the head signal, if any.
    pub fn drain_one_if_any(&mut self) -> Option<CompletionSignal> {
        self.queue.pop_front()
    }

    /// Keep a drained signal for reuse if there is room, otherwise drop it.
    pub fn recycle(&mut self, signal: CompletionSignal) {
        debug_assert!(signal.is_completed(), "recycled signal was never completed");
        if self.spare.len() < self.max_spare {
            self.spare.push(signal);
        }
    }

    /// Number of queued (not yet drained) waiters.
    pub fn count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of drained signals held for reuse.
    pub fn spare_count(&self) -> usize {
        self.spare.len()
    }
}

impl Default for WaiterPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_and_complete(pool: &mut WaiterPool) -> bool {
        match pool.drain_one_if_any() {
            Some(signal) => {
                signal.try_complete();
                pool.recycle(signal);
                true
            }
            None => false,
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut pool = WaiterPool::new();
        let first = pool.register_or_reuse();
        let second = pool.register_or_reuse();
        assert_eq!(pool.count(), 2);

        assert!(drain_and_complete(&mut pool));
        assert!(first.is_completed());
        assert!(!second.is_completed());

        assert!(drain_and_complete(&mut pool));
        assert!(second.is_completed());
        assert!(pool.is_empty());
        assert!(!drain_and_complete(&mut pool));
    }

    #[test]
    fn test_reuses_released_signal() {
        let mut pool = WaiterPool::new();
        let waiter = pool.register_or_reuse();
        drain_and_complete(&mut pool);
        assert_eq!(pool.spare_count(), 1);

        // Still held by its producer: a fresh signal is allocated.
        let other = pool.register_or_reuse();
        assert_eq!(pool.spare_count(), 1);
        assert!(!other.is_completed());
        drain_and_complete(&mut pool);
        assert_eq!(pool.spare_count(), 2);

        drop(waiter);
        drop(other);
        let reused = pool.register_or_reuse();
        assert_eq!(pool.spare_count(), 1);
        assert!(!reused.is_completed());
    }

    #[test]
    fn test_abandoned_waiter_drains_cleanly() {
        let mut pool = WaiterPool::new();
        drop(pool.register_or_reuse());
        let live = pool.register_or_reuse();

        assert!(drain_and_complete(&mut pool));
        assert!(drain_and_complete(&mut pool));
        assert!(live.is_completed());
    }

    #[test]
    fn test_spare_capacity_bounded() {
        let mut pool = WaiterPool::with_max_spare(1);
        let _a = pool.register_or_reuse();
        let _b = pool.register_or_reuse();
        while drain_and_complete(&mut pool) {}
        assert_eq!(pool.spare_count(), 1);
    }
}
